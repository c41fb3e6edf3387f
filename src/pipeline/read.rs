//! Reader thread: streams container records into the worker channel, in container order.

use crossbeam_channel::Sender;
use log::debug;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use crate::ContainerRecord;
use crate::engine::container::ContainerReader;
use crate::engine::tools::cancel_requested;
use crate::error::Result;

use super::context::ReaderControl;

pub fn spawn_reader_thread(
    reader: ContainerReader,
    record_tx: Sender<ContainerRecord>,
    control: ReaderControl,
) -> JoinHandle<Result<u64>> {
    thread::spawn(move || run_read_loop(reader, record_tx, control))
}

/// Send every record to `record_tx`. Stops at the first corrupt record (returned as the error),
/// when cancel/stop is set, or when all workers have hung up. Drops `record_tx` on exit so
/// workers see the channel close. Returns the number of records sent.
pub fn run_read_loop<I>(
    records: I,
    record_tx: Sender<ContainerRecord>,
    control: ReaderControl,
) -> Result<u64>
where
    I: Iterator<Item = Result<ContainerRecord>>,
{
    let mut sent = 0_u64;
    for record in records {
        if cancel_requested(control.cancel.as_ref()) || control.stop.load(Ordering::Relaxed) {
            debug!("reader: stopping early after {} records", sent);
            break;
        }
        if record_tx.send(record?).is_err() {
            debug!("reader: all workers gone after {} records", sent);
            break;
        }
        sent += 1;
    }
    drop(record_tx);
    debug!("reader: channel closed, {} records sent", sent);
    Ok(sent)
}
