//! Module registration artifact
//!
//! The ordered batch of descriptors produced for one compilation unit. It is
//! what the processor writes to disk and what the runtime bridge loads.

use super::descriptor::{BindingDescriptor, DescriptorId};
use super::key::BindingKey;
use crate::constants::REGISTRATION_FORMAT_VERSION;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Ordered, read-only collection of binding descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRegistration {
    /// Artifact format version
    pub format_version: u32,
    /// Crate the descriptors were collected from
    pub crate_name: String,
    /// Descriptor arena, `descriptors[i].id == i`
    pub descriptors: Vec<BindingDescriptor>,
    /// SHA-256 over the canonical descriptor JSON
    pub fingerprint: String,
}

impl ModuleRegistration {
    /// Create a registration and compute its fingerprint
    pub fn new(crate_name: impl Into<String>, descriptors: Vec<BindingDescriptor>) -> Result<Self> {
        let fingerprint = Self::compute_fingerprint(&descriptors)?;
        Ok(Self {
            format_version: REGISTRATION_FORMAT_VERSION,
            crate_name: crate_name.into(),
            descriptors,
            fingerprint,
        })
    }

    /// Fingerprint of a descriptor list
    pub fn compute_fingerprint(descriptors: &[BindingDescriptor]) -> Result<String> {
        let canonical = serde_json::to_vec(descriptors)?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }

    /// Descriptor by arena id
    pub fn get(&self, id: DescriptorId) -> Option<&BindingDescriptor> {
        self.descriptors.get(id.index())
    }

    /// Descriptor bound to a key
    pub fn find(&self, key: &BindingKey) -> Option<&BindingDescriptor> {
        self.descriptors.iter().find(|d| &d.key == key)
    }

    /// Iterate descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True if the registration has no descriptors
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Check structural consistency of a loaded artifact
    ///
    /// Rejects unknown format versions, arena ids out of place, local
    /// dependency targets out of bounds and tampered fingerprints.
    pub fn verify(&self) -> Result<()> {
        if self.format_version != REGISTRATION_FORMAT_VERSION {
            return Err(Error::invalid_argument(format!(
                "Registration '{}' has format version {}, expected {}",
                self.crate_name, self.format_version, REGISTRATION_FORMAT_VERSION
            )));
        }
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            if descriptor.id.index() != index {
                return Err(Error::invalid_argument(format!(
                    "Descriptor {} of '{}' is stored at slot {}",
                    descriptor.id, self.crate_name, index
                )));
            }
            if let Some(bad) = descriptor
                .local_dependencies()
                .find(|id| id.index() >= self.descriptors.len())
            {
                return Err(Error::invalid_argument(format!(
                    "Descriptor {} of '{}' refers to missing descriptor {}",
                    descriptor.key, self.crate_name, bad
                )));
            }
        }
        let expected = Self::compute_fingerprint(&self.descriptors)?;
        if expected != self.fingerprint {
            return Err(Error::invalid_argument(format!(
                "Registration '{}' fingerprint mismatch",
                self.crate_name
            )));
        }
        Ok(())
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and verify an artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let registration: Self = serde_json::from_str(json)?;
        registration.verify()?;
        Ok(registration)
    }

    /// Read and verify an artifact file
    pub fn read_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::io_with_source(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json(&json)
    }

    /// Write the artifact file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| {
            Error::io_with_source(format!("Failed to write {}", path.display()), e)
        })
    }
}
