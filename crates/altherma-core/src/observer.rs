// ── Device observer port ──
//
// Discovery and refresh report what they found (and what they skipped)
// through this port instead of a process-wide logger. The default
// implementation forwards to `tracing`; tests plug in `NoopObserver` or a
// recording observer.

use crate::error::CoreError;
use crate::unit::FunctionKind;

/// Why a discovery scan ended before the last slot.
#[derive(Debug)]
pub enum ScanStop<'a> {
    /// The slot answered with a non-success code.
    Code(i64),
    /// The exchange itself failed.
    Transport(&'a CoreError),
    /// The slot answered without a result code.
    NoResponse,
}

/// Receives discovery and refresh events from a `DeviceController`.
pub trait DeviceObserver: Send + Sync {
    /// Slot `slot` answered and is being registered under `key`.
    fn unit_discovered(&self, slot: u8, key: &str, label: &str, kind: FunctionKind);

    /// Scanning stopped at `slot`.
    fn scan_stopped(&self, slot: u8, reason: &ScanStop<'_>);

    /// Something odd but non-fatal happened while registering `slot`.
    fn discovery_warning(&self, slot: u8, message: &str);

    /// Refreshing the unit registered under `key` failed.
    fn refresh_failed(&self, key: &str, error: &CoreError);
}

/// Emits every event as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DeviceObserver for TracingObserver {
    fn unit_discovered(&self, slot: u8, key: &str, label: &str, kind: FunctionKind) {
        tracing::info!(slot, key, label, kind = %kind, "discovered unit");
    }

    fn scan_stopped(&self, slot: u8, reason: &ScanStop<'_>) {
        match reason {
            ScanStop::Code(code) => {
                tracing::debug!(slot, code, "no unit at slot, scan finished");
            }
            ScanStop::Transport(error) => {
                tracing::warn!(slot, error = %error, "scan aborted by exchange failure");
            }
            ScanStop::NoResponse => {
                tracing::debug!(slot, "slot answered without result code, scan finished");
            }
        }
    }

    fn discovery_warning(&self, slot: u8, message: &str) {
        tracing::warn!(slot, "{message}");
    }

    fn refresh_failed(&self, key: &str, error: &CoreError) {
        tracing::warn!(unit = key, error = %error, "profile refresh failed");
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DeviceObserver for NoopObserver {
    fn unit_discovered(&self, _: u8, _: &str, _: &str, _: FunctionKind) {}
    fn scan_stopped(&self, _: u8, _: &ScanStop<'_>) {}
    fn discovery_warning(&self, _: u8, _: &str) {}
    fn refresh_failed(&self, _: &str, _: &CoreError) {}
}
