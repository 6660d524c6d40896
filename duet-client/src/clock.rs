use chrono::Local;

/// Source of the display stamp attached to chat lines.
pub trait Clock: Send + Sync {
    fn now_label(&self) -> String;
}

/// Local wall clock, two-digit hour and minute.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now_label(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}

/// Always returns the same label.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_label(&self) -> String {
        self.0.clone()
    }
}
