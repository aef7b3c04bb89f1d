//! Resource pool - finite, named capacity ledger
//!
//! Allocation is all-or-nothing within a single call: every requested
//! resource is validated before any debit commits. Releases are
//! guarded so `available` can never exceed `total`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Amount;

/// Declared capacity for one named resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub total: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCapacity {
    pub total: Amount,
    pub available: Amount,
}

/// Ledger of named resources with total and available capacity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    resources: AHashMap<String, ResourceCapacity>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource with its total capacity.
    ///
    /// Fails if the name is already registered or the capacity is not
    /// positive.
    pub fn add_resource(&mut self, name: &str, total: Amount) -> Result<()> {
        if total <= 0 {
            return Err(SimError::Resource(format!(
                "resource '{}' must have positive capacity, got {}",
                name, total
            )));
        }
        if self.resources.contains_key(name) {
            return Err(SimError::Resource(format!(
                "resource '{}' is already registered",
                name
            )));
        }
        self.resources.insert(
            name.to_string(),
            ResourceCapacity {
                total,
                available: total,
            },
        );
        Ok(())
    }

    /// Allocate several resources atomically.
    ///
    /// Validates every requirement first; if any resource is missing or
    /// short, nothing is debited and the shortfall is reported.
    pub fn allocate(&mut self, requirements: &AHashMap<String, Amount>) -> Result<()> {
        // Validation pass: no debits until every line item clears
        for (name, requested) in requirements {
            if *requested < 0 {
                return Err(SimError::Resource(format!(
                    "allocation amount for '{}' cannot be negative",
                    name
                )));
            }
            let capacity = self.resources.get(name).ok_or_else(|| {
                SimError::Resource(format!("unknown resource '{}'", name))
            })?;
            if capacity.available < *requested {
                return Err(SimError::InsufficientResource {
                    name: name.clone(),
                    requested: *requested,
                    available: capacity.available,
                });
            }
        }

        // Commit pass
        for (name, requested) in requirements {
            if let Some(capacity) = self.resources.get_mut(name) {
                capacity.available -= requested;
            }
        }
        Ok(())
    }

    /// Release previously allocated amounts back to the pool.
    ///
    /// Fails if any credit would push `available` above `total`.
    pub fn release(&mut self, amounts: &AHashMap<String, Amount>) -> Result<()> {
        for (name, amount) in amounts {
            if *amount < 0 {
                return Err(SimError::Resource(format!(
                    "release amount for '{}' cannot be negative",
                    name
                )));
            }
            let capacity = self.resources.get(name).ok_or_else(|| {
                SimError::Resource(format!("unknown resource '{}'", name))
            })?;
            if capacity.available + amount > capacity.total {
                return Err(SimError::Resource(format!(
                    "releasing {} of '{}' would exceed total capacity {}",
                    amount, name, capacity.total
                )));
            }
        }
        for (name, amount) in amounts {
            if let Some(capacity) = self.resources.get_mut(name) {
                capacity.available += amount;
            }
        }
        Ok(())
    }

    /// Apply a signed delta to one resource.
    ///
    /// Negative deltas go through the insufficiency check, positive
    /// deltas through the over-release guard, so consequence-driven
    /// mutation obeys the same caps as allocation.
    pub fn adjust(&mut self, name: &str, delta: Amount) -> Result<()> {
        let capacity = self
            .resources
            .get(name)
            .ok_or_else(|| SimError::Resource(format!("unknown resource '{}'", name)))?;

        if delta < 0 {
            let requested = -delta;
            if capacity.available < requested {
                return Err(SimError::InsufficientResource {
                    name: name.to_string(),
                    requested,
                    available: capacity.available,
                });
            }
        } else if capacity.available + delta > capacity.total {
            return Err(SimError::Resource(format!(
                "adjusting '{}' by {} would exceed total capacity {}",
                name, delta, capacity.total
            )));
        }

        if let Some(capacity) = self.resources.get_mut(name) {
            capacity.available += delta;
        }
        Ok(())
    }

    pub fn available(&self, name: &str) -> Amount {
        self.resources.get(name).map(|c| c.available).unwrap_or(0)
    }

    pub fn total(&self, name: &str) -> Amount {
        self.resources.get(name).map(|c| c.total).unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Read-only view for reporting and snapshots
    pub fn snapshot(&self) -> &AHashMap<String, ResourceCapacity> {
        &self.resources
    }

    /// Rebuild a pool from persisted state (snapshot restore path)
    pub fn from_parts(resources: AHashMap<String, ResourceCapacity>) -> Self {
        Self { resources }
    }
}
