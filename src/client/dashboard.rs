use serde::Serialize;
use uuid::Uuid;

use crate::client::session::Session;
use crate::client::storage::TokenStorage;
use crate::client::ClientError;
use crate::models::{EmployeeSummary, LeaveStatus, LeaveType, LeaveView};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl LeaveStats {
    pub fn tally(leaves: &[LeaveView]) -> Self {
        leaves.iter().fold(Self::default(), |mut stats, view| {
            stats.total += 1;
            match view.leave.status {
                LeaveStatus::Pending => stats.pending += 1,
                LeaveStatus::Approved => stats.approved += 1,
                LeaveStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_employees: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Issues a ticket per fetch; only the newest ticket may apply its result.
#[derive(Debug, Default)]
struct Generation {
    issued: u64,
}

impl Generation {
    fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Bindings of the new-request form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeaveForm {
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
}

#[derive(Debug, Default)]
pub struct EmployeeDashboard {
    pub leaves: Vec<LeaveView>,
    pub show_form: bool,
    pub form: LeaveForm,
    pub last_error: Option<String>,
    generation: Generation,
}

impl EmployeeDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> LeaveStats {
        LeaveStats::tally(&self.leaves)
    }

    pub fn open_form(&mut self) {
        self.show_form = true;
    }

    pub fn close_form(&mut self) {
        self.show_form = false;
    }

    /// Start a fetch of the caller's leaves. Pair with [`Self::apply_leaves`]
    /// when the fetch is driven elsewhere.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation.begin()
    }

    /// Apply a fetch result. Returns `false` and leaves state untouched when a
    /// newer fetch has been started since `ticket` was issued.
    pub fn apply_leaves(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<LeaveView>, ClientError>,
    ) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        match result {
            Ok(leaves) => {
                self.leaves = leaves;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Error fetching leaves: {e}");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn refresh<S: TokenStorage>(&mut self, session: &mut Session<S>) {
        let ticket = self.begin_fetch();
        let result = session.api().leaves().await;
        let result = session.check(result).await;
        self.apply_leaves(ticket, result);
    }

    /// Submit the form. On success the form closes, resets and the list is
    /// fetched again; on failure the form stays open with its contents.
    pub async fn submit<S: TokenStorage>(
        &mut self,
        session: &mut Session<S>,
    ) -> Result<LeaveView, ClientError> {
        let result = session.api().create_leave(&self.form).await;
        match session.check(result).await {
            Ok(created) => {
                self.show_form = false;
                self.form = LeaveForm::default();
                self.refresh(session).await;
                Ok(created)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Leaves,
    Employees,
}

#[derive(Debug, Default)]
pub struct AdminDashboard {
    pub tab: AdminTab,
    pub leaves: Vec<LeaveView>,
    pub employees: Vec<EmployeeSummary>,
    pub last_error: Option<String>,
    leaves_generation: Generation,
    employees_generation: Generation,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AdminStats {
        let leaves = LeaveStats::tally(&self.leaves);
        AdminStats {
            total_employees: self.employees.len(),
            pending: leaves.pending,
            approved: leaves.approved,
            rejected: leaves.rejected,
        }
    }

    /// Switch tabs and load that tab's data.
    pub async fn select_tab<S: TokenStorage>(&mut self, session: &mut Session<S>, tab: AdminTab) {
        self.tab = tab;
        self.refresh(session).await;
    }

    pub async fn refresh<S: TokenStorage>(&mut self, session: &mut Session<S>) {
        match self.tab {
            AdminTab::Leaves => self.refresh_leaves(session).await,
            AdminTab::Employees => {
                let ticket = self.begin_employees_fetch();
                let result = session.api().employees().await.map(|dir| dir.employees);
                let result = session.check(result).await;
                self.apply_employees(ticket, result);
            }
        }
    }

    pub fn begin_leaves_fetch(&mut self) -> FetchTicket {
        self.leaves_generation.begin()
    }

    pub fn begin_employees_fetch(&mut self) -> FetchTicket {
        self.employees_generation.begin()
    }

    pub fn apply_leaves(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<LeaveView>, ClientError>,
    ) -> bool {
        if !self.leaves_generation.is_current(ticket) {
            return false;
        }
        match result {
            Ok(leaves) => {
                self.leaves = leaves;
                self.last_error = None;
            }
            Err(e) => self.record_error("leaves", e),
        }
        true
    }

    pub fn apply_employees(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<EmployeeSummary>, ClientError>,
    ) -> bool {
        if !self.employees_generation.is_current(ticket) {
            return false;
        }
        match result {
            Ok(employees) => {
                self.employees = employees;
                self.last_error = None;
            }
            Err(e) => self.record_error("employees", e),
        }
        true
    }

    /// Approve or reject, then swap the returned record into the list. Any
    /// fetch of the list still in flight is superseded by this update.
    pub async fn decide<S: TokenStorage>(
        &mut self,
        session: &mut Session<S>,
        leave_id: Uuid,
        status: LeaveStatus,
    ) -> Result<(), ClientError> {
        let result = session.api().update_leave_status(leave_id, status).await;
        let updated = match session.check(result).await {
            Ok(resp) => resp.leave,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.leaves_generation.begin();
        if let Some(slot) = self.leaves.iter_mut().find(|l| l.leave.id == leave_id) {
            *slot = updated;
        } else {
            self.refresh_leaves(session).await;
        }
        Ok(())
    }

    async fn refresh_leaves<S: TokenStorage>(&mut self, session: &mut Session<S>) {
        let ticket = self.begin_leaves_fetch();
        let result = session.api().leaves().await;
        let result = session.check(result).await;
        self.apply_leaves(ticket, result);
    }

    fn record_error(&mut self, what: &str, e: ClientError) {
        tracing::warn!("Error fetching {what}: {e}");
        self.last_error = Some(e.to_string());
    }
}
