/*!
 * Busy Guard
 * Power bracket held for the lifetime of the guard
 */

use super::{Guard, GuardError, GuardResult};
use crate::power::PowerBracket;

/// Keeps the device busy until dropped or released
pub struct BusyGuard<'a> {
    power: &'a dyn PowerBracket,
    active: bool,
}

impl<'a> BusyGuard<'a> {
    /// Mark the device busy
    pub fn new(power: &'a dyn PowerBracket) -> Self {
        power.busy();
        Self {
            power,
            active: true,
        }
    }
}

impl Guard for BusyGuard<'_> {
    fn resource_type(&self) -> &'static str {
        "power_bracket"
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::AlreadyReleased);
        }
        self.active = false;
        self.power.idle();
        Ok(())
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.power.idle();
        }
    }
}
