// core/src/telemetry.rs
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::error::Result;

/// Tellere for lagring og eksport, i et eget register (ikke det globale).
#[derive(Clone)]
pub struct Telemetry {
    registry: Registry,
    pub captures_merged: IntCounter,
    pub captures_replaced: IntCounter,
    pub csv_rows_exported: IntCounter,
}

impl Telemetry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let captures_merged = IntCounter::new(
            "captures_merged_total",
            "Fangster flettet inn i lagret økt",
        )?;
        let captures_replaced = IntCounter::new(
            "captures_replaced_total",
            "Fangster som erstattet lagret økt",
        )?;
        let csv_rows_exported = IntCounter::new(
            "csv_rows_exported_total",
            "Datarader skrevet til CSV",
        )?;

        registry.register(Box::new(captures_merged.clone()))?;
        registry.register(Box::new(captures_replaced.clone()))?;
        registry.register(Box::new(csv_rows_exported.clone()))?;

        Ok(Self { registry, captures_merged, captures_replaced, csv_rows_exported })
    }

    /// Prometheus tekstformat.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("captures_merged", &self.captures_merged.get())
            .field("captures_replaced", &self.captures_replaced.get())
            .field("csv_rows_exported", &self.csv_rows_exported.get())
            .finish()
    }
}
