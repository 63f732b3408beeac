use jiff::civil::Date;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        }
    }
}

/// The patient a calculator is attached for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub birth_date: Option<Date>,
    #[serde(default)]
    pub sex: Option<Sex>,
}

impl Subject {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn born(mut self, birth_date: Date) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    /// Completed years of age on `on`.
    pub fn age_on(&self, on: Date) -> Option<i64> {
        let birth = self.birth_date?;
        if on < birth {
            return None;
        }
        let mut years = i64::from(on.year()) - i64::from(birth.year());
        if (on.month(), on.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        Some(years)
    }

    /// Age today, in the system time zone.
    pub fn age(&self) -> Option<i64> {
        self.age_on(jiff::Zoned::now().date())
    }
}
