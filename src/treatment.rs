use serde::Serialize;

use crate::drugs::{DrugId, Formulary};
use crate::infection::Infection;

/// The drug a person is currently given and for how long they have been on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Treatment {
    drug: DrugId,
    time_treated: u32,
}

impl Default for Treatment {
    fn default() -> Self {
        Treatment::new(DrugId::FIRST_LINE)
    }
}

impl Treatment {
    #[must_use]
    pub fn new(drug: DrugId) -> Self {
        Treatment {
            drug,
            time_treated: 0,
        }
    }

    #[must_use]
    pub fn drug(&self) -> DrugId {
        self.drug
    }

    #[must_use]
    pub fn time_treated(&self) -> u32 {
        self.time_treated
    }

    /// Moves up to the next drug, restarting the treatment clock. Does nothing on the last
    /// resort. Returns whether the drug changed.
    pub fn escalate(&mut self, formulary: &Formulary) -> bool {
        match formulary.next(self.drug) {
            Some(next) => {
                self.drug = next;
                self.time_treated = 0;
                true
            }
            None => false,
        }
    }

    /// Jumps straight to `drug` if it is stronger than the current one.
    pub fn raise_to(&mut self, drug: DrugId) -> bool {
        if drug > self.drug {
            self.drug = drug;
            self.time_treated = 0;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn counters(&self, infection: &Infection) -> bool {
        !infection.is_resistant_to(self.drug)
    }

    pub(crate) fn tick(&mut self) {
        self.time_treated += 1;
    }
}
