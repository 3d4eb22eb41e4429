//! Daily health trackers: water intake and macro-nutrients
//!
//! These trackers only live in memory. Nothing here is sent to the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Default daily water goal, in ml
pub const WATER_GOAL_ML: u32 = 3000;

/// The quick-add amounts, in ml, with their labels
pub const QUICK_AMOUNTS: [(u32, &str); 3] = [
    (250, "Glass"),
    (500, "Bottle"),
    (1000, "Liter"),
];

/// `current` as a rounded percentage of `target`, capped at 100
pub fn capped_percentage(current: f64, target: f64) -> u32 {
    if target <= 0.0 {
        return 100;
    }
    let percentage = (current / target * 100.0).round();
    if percentage <= 0.0 {
        0
    } else {
        percentage.min(100.0) as u32
    }
}

/// Water intake, per day
#[derive(Clone, Debug)]
pub struct WaterLog {
    goal_ml: u32,
    current_day: NaiveDate,
    history: BTreeMap<NaiveDate, u32>,
}

impl WaterLog {
    /// A log that shows `today`, with the default goal
    pub fn new(today: NaiveDate) -> Self {
        Self::with_goal(today, WATER_GOAL_ML)
    }

    pub fn with_goal(today: NaiveDate, goal_ml: u32) -> Self {
        Self {
            goal_ml,
            current_day: today,
            history: BTreeMap::new(),
        }
    }

    pub fn goal_ml(&self) -> u32 { self.goal_ml }
    pub fn current_day(&self) -> NaiveDate { self.current_day }

    /// What has been drunk on the current day
    pub fn intake_ml(&self) -> u32 {
        self.intake_on(self.current_day)
    }

    pub fn intake_on(&self, day: NaiveDate) -> u32 {
        self.history.get(&day).copied().unwrap_or(0)
    }

    /// Add some water to the current day
    pub fn add(&mut self, amount_ml: u32) {
        let intake = self.history.entry(self.current_day).or_insert(0);
        *intake = intake.saturating_add(amount_ml);
    }

    /// Add an amount typed by the user. Only positive whole numbers of ml are accepted
    pub fn add_custom(&mut self, amount: &str) -> bool {
        match amount.trim().parse::<u32>() {
            Ok(amount_ml) if amount_ml > 0 => {
                self.add(amount_ml);
                true
            },
            _ => {
                log::debug!("Ignoring invalid water amount {:?}", amount);
                false
            },
        }
    }

    /// Forget what has been drunk on the current day
    pub fn reset(&mut self) {
        self.history.insert(self.current_day, 0);
    }

    pub fn percentage(&self) -> u32 {
        capped_percentage(self.intake_ml() as f64, self.goal_ml as f64)
    }

    pub fn status_message(&self) -> &'static str {
        match self.percentage() {
            0 => "Start drinking!",
            1..=24 => "Keep drinking!",
            25..=49 => "Good progress!",
            50..=74 => "Well done!",
            75..=99 => "Almost there!",
            _ => "Goal achieved! 🎉",
        }
    }

    pub fn previous_day(&mut self) {
        if let Some(day) = self.current_day.pred_opt() {
            self.current_day = day;
        }
    }

    /// Show the next day, unless it is after `today`
    pub fn next_day(&mut self, today: NaiveDate) -> bool {
        match self.current_day.succ_opt() {
            Some(day) if day <= today => {
                self.current_day = day;
                true
            },
            _ => false,
        }
    }
}


/// Daily macro-nutrient targets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Default for MacroTargets {
    fn default() -> Self {
        Self {
            calories: 1800.0,
            protein_g: 120.0,
            carbs_g: 200.0,
            fat_g: 60.0,
        }
    }
}

/// What has been eaten so far, against daily targets
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MacroProgress {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub targets: MacroTargets,
}

impl MacroProgress {
    pub fn new(targets: MacroTargets) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    /// Record a meal
    pub fn add_meal(&mut self, calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) {
        self.calories += calories;
        self.protein_g += protein_g;
        self.carbs_g += carbs_g;
        self.fat_g += fat_g;
    }

    pub fn calories_percentage(&self) -> u32 { capped_percentage(self.calories, self.targets.calories) }
    pub fn protein_percentage(&self) -> u32 { capped_percentage(self.protein_g, self.targets.protein_g) }
    pub fn carbs_percentage(&self) -> u32 { capped_percentage(self.carbs_g, self.targets.carbs_g) }
    pub fn fat_percentage(&self) -> u32 { capped_percentage(self.fat_g, self.targets.fat_g) }
}
