// ABOUTME: Activity log records (exercise, medication, diet) and rehabilitation plans
// ABOUTME: These are the inputs consumed by the completion aggregator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of a rehabilitation plan
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// The plan currently being measured against
    #[default]
    Active,
    /// The plan ran to completion
    Completed,
    /// The plan was abandoned
    Cancelled,
}

impl Display for PlanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::invalid_input(format!("Invalid plan status: {s}"))),
        }
    }
}

impl PlanStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Activity domain a prescribed plan item belongs to
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanDomain {
    /// Prescribed exercise items
    Exercise,
    /// Prescribed medication items
    Medication,
    /// Prescribed diet items
    Diet,
}

impl Display for PlanDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanDomain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exercise" => Ok(Self::Exercise),
            "medication" => Ok(Self::Medication),
            "diet" => Ok(Self::Diet),
            _ => Err(AppError::invalid_input(format!("Invalid plan domain: {s}"))),
        }
    }
}

impl PlanDomain {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Medication => "medication",
            Self::Diet => "diet",
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// One logged exercise session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// When the session was logged
    pub logged_at: DateTime<Utc>,
    /// Self-reported completion percentage, 0-100
    pub completion_rate: Option<i32>,
    /// Post-activity pain score, 1-10
    pub pain_after: Option<i32>,
    /// Self-reported effort rating (RPE), 1-10
    pub rpe: Option<i32>,
    /// Session duration in seconds
    pub duration_sec: Option<i32>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// One logged medication intake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// When the dose was (or should have been) taken
    pub taken_at: DateTime<Utc>,
    /// Whether the dose was actually taken
    pub taken: bool,
    /// Free-form notes
    pub notes: Option<String>,
}

/// One logged diet event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietLog {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// When the meal was logged
    pub logged_at: DateTime<Utc>,
    /// Whether the meal plan item was explicitly marked completed
    pub completed: bool,
    /// Consumed portion percentage, 0-100
    pub portion_consumed: Option<i32>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// A prescribed rehabilitation plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehabPlan {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Display title
    pub title: String,
    /// Lifecycle status
    pub status: PlanStatus,
    /// When the plan was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn plan_enums_round_trip_their_database_strings() {
        for status in [PlanStatus::Active, PlanStatus::Completed, PlanStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<PlanStatus>().unwrap(), status);
            assert_eq!(status.to_string(), status.as_str());
        }
        for domain in [PlanDomain::Exercise, PlanDomain::Medication, PlanDomain::Diet] {
            assert_eq!(domain.as_str().parse::<PlanDomain>().unwrap(), domain);
            assert_eq!(domain.to_string(), domain.as_str());
        }
        assert!("archived".parse::<PlanStatus>().is_err());
    }
}
