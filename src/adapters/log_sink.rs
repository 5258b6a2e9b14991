//! Event sink that renders domain events as log lines.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::SessionStarted {
                transaction_id,
                offline,
            } => {
                if *offline {
                    warn!("[event] session started offline as {transaction_id}");
                } else {
                    info!("[event] session started, transaction {transaction_id}");
                }
            }
            AppEvent::StartRefused(reason) => warn!("[event] start refused: {reason}"),
            AppEvent::ItemScanned {
                snapshot,
                fused,
                item_weight_g,
            } => info!(
                "[event] item scanned: {fused} ({item_weight_g:.1}g, raw {}, metal {})",
                snapshot.raw_label, snapshot.metal_detected
            ),
            AppEvent::ScanFailed(reason) => warn!("[event] scan failed: {reason}"),
            AppEvent::SessionStopped {
                plastic,
                cans,
                other,
                total_weight_g,
            } => info!(
                "[event] session stopped: {plastic} plastic, {cans} cans, {other} other, {total_weight_g:.1}g"
            ),
            AppEvent::SessionReset => info!("[event] session reset"),
        }
    }
}
