use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    #[default]
    Annual,
    Sick,
    Unpaid,
}

impl LeaveType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "annual" => Some(LeaveType::Annual),
            "sick" => Some(LeaveType::Sick),
            "unpaid" => Some(LeaveType::Unpaid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "leave_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            _ => None,
        }
    }

    /// Approved and rejected are final.
    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
        )
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Leave {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedDates {
    pub start_date: String,
    pub end_date: String,
}

/// Wire representation of a leave: the record, its display dates and,
/// where the caller is allowed to see it, the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveView {
    #[serde(flatten)]
    pub leave: Leave,
    pub formatted_dates: FormattedDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl LeaveView {
    pub fn new(leave: Leave, user: Option<User>) -> Self {
        let formatted_dates = FormattedDates {
            start_date: leave.start_date.format("%Y-%m-%d").to_string(),
            end_date: leave.end_date.format("%Y-%m-%d").to_string(),
        };
        Self {
            leave,
            formatted_dates,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_decision() {
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Pending.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn decisions_are_terminal() {
        for decided in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            for next in [
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                LeaveStatus::Rejected,
            ] {
                assert!(!decided.can_transition_to(next));
            }
        }
    }

    #[test]
    fn view_serializes_type_key_and_formatted_dates() {
        let leave = Leave {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            start_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 1, 5).unwrap(),
            reason: "trip".to_string(),
            leave_type: LeaveType::Sick,
            status: LeaveStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(LeaveView::new(leave, None)).unwrap();
        assert_eq!(json["type"], "sick");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["start_date"], "2099-01-01");
        assert_eq!(json["formatted_dates"]["end_date"], "2099-01-05");
        assert!(json.get("user").is_none());
    }
}
