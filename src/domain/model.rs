use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 尚未實作使用者帳號，所有任務都屬於這個擁有者
pub const DEFAULT_OWNER_ID: i64 = 1;

const FREQUENCY_VALUE_REQUIRED: &str = "frequency_value is required when frequency is 'other'";
const FREQUENCY_VALUE_NOT_ALLOWED: &str =
    "frequency_value can only be set when frequency is 'other'";

/// How often a task should be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
    /// Custom interval, measured in days by `frequency_value`.
    Other,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Other => "other",
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Frequency::Other)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            "other" => Ok(Frequency::Other),
            _ => Err(AppError::InvalidValueError {
                field: "frequency".to_string(),
                value: s.to_string(),
                reason: "Expected one of: daily, weekly, monthly, yearly, other".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub frequency: Frequency,
    pub frequency_value: Option<u32>,
    pub last_done: Option<NaiveDate>,
    pub next_to_do: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated task waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub frequency: Frequency,
    pub frequency_value: Option<u32>,
    pub last_done: Option<NaiveDate>,
    pub next_to_do: Option<NaiveDate>,
}

impl NewTask {
    pub fn into_task(self, id: i64, now: DateTime<Utc>) -> Task {
        Task {
            id,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            frequency: self.frequency,
            frequency_value: self.frequency_value,
            last_done: self.last_done,
            next_to_do: self.next_to_do,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_done: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_to_do: Option<NaiveDate>,
}

impl TaskCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 驗證輸入並套用頻率規則
    pub fn into_new_task(self, owner_id: i64) -> Result<NewTask> {
        validate_non_empty_string("name", &self.name)?;

        let frequency_value = match (self.frequency, self.frequency_value) {
            (Frequency::Other, None) => {
                return Err(AppError::ValidationError {
                    message: FREQUENCY_VALUE_REQUIRED.to_string(),
                })
            }
            (Frequency::Other, Some(value)) => {
                validate_positive_number("frequency_value", value as usize, 1)?;
                Some(value)
            }
            (frequency, Some(value)) => {
                tracing::debug!(
                    "Discarding frequency_value {} for '{}' task",
                    value,
                    frequency
                );
                None
            }
            (_, None) => None,
        };

        Ok(NewTask {
            name: self.name,
            description: self.description,
            owner_id,
            frequency: self.frequency,
            frequency_value,
            last_done: self.last_done,
            next_to_do: self.next_to_do,
        })
    }
}

/// Partial update. Nullable fields use `Some(None)` for an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub frequency_value: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_done: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_to_do: Option<Option<NaiveDate>>,
}

fn explicit_null<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskUpdate {
    /// 套用更新；驗證失敗時不會修改任務
    pub fn apply_to(self, task: &mut Task) -> Result<()> {
        if let Some(name) = &self.name {
            validate_non_empty_string("name", name)?;
        }

        let (frequency, frequency_value) = self.resolve_frequency(task)?;

        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(last_done) = self.last_done {
            task.last_done = last_done;
        }
        if let Some(next_to_do) = self.next_to_do {
            task.next_to_do = next_to_do;
        }
        task.frequency = frequency;
        task.frequency_value = frequency_value;

        Ok(())
    }

    fn resolve_frequency(&self, task: &Task) -> Result<(Frequency, Option<u32>)> {
        let resolved = match (self.frequency, self.frequency_value) {
            // 切換到 other 時必須一併提供間隔
            (Some(Frequency::Other), Some(Some(value))) => (Frequency::Other, Some(value)),
            (Some(Frequency::Other), _) => {
                return Err(AppError::BadRequest {
                    message: FREQUENCY_VALUE_REQUIRED.to_string(),
                })
            }
            (Some(frequency), _) => (frequency, None),
            (None, None) => (task.frequency, task.frequency_value),
            (None, Some(value)) if task.frequency.is_other() => match value {
                Some(value) => (Frequency::Other, Some(value)),
                None => {
                    return Err(AppError::BadRequest {
                        message: FREQUENCY_VALUE_REQUIRED.to_string(),
                    })
                }
            },
            (None, Some(None)) => (task.frequency, None),
            (None, Some(Some(_))) => {
                return Err(AppError::ValidationError {
                    message: FREQUENCY_VALUE_NOT_ALLOWED.to_string(),
                })
            }
        };

        if let Some(value) = resolved.1 {
            validate_positive_number("frequency_value", value as usize, 1)?;
        }

        Ok(resolved)
    }
}
