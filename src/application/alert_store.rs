// In-memory alert set with positional identities
use crate::domain::alert::{Alert, RawAlert};

/// Alerts from the latest fetch, minus the ones the operator dismissed.
///
/// Identities are positions within the batch they came from. Every
/// `replace_all` starts again at 0, so a dismissed alert comes back if the
/// service still reports it on the next refresh.
#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    alerts: Vec<Alert>,
}

impl AlertStore {
    pub fn replace_all(&mut self, raw: Vec<RawAlert>) -> &[Alert] {
        self.alerts = raw
            .into_iter()
            .enumerate()
            .map(|(id, alert)| Alert::new(id, alert))
            .collect();
        &self.alerts
    }

    /// Remove the alert with `id`. Returns `None` if the current batch has no such alert.
    pub fn dismiss(&mut self, id: usize) -> Option<&[Alert]> {
        let index = self.alerts.iter().position(|alert| alert.id == id)?;
        self.alerts.remove(index);
        Some(&self.alerts)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }
}
