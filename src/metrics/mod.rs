//! Fire-and-forget activity counters. Emission only; exposition is owned by
//! the embedding service.

use lazy_static::lazy_static;
use prometheus::register_int_counter;
use prometheus::IntCounter;

lazy_static! {
    pub static ref RELEASE_MESSAGES_SENT: IntCounter = register_int_counter!(
        "release_messages_sent_total",
        "Release messages appended to the message log"
    )
    .expect("metric can not be created");

    pub static ref RELEASE_MESSAGES_SCANNED: IntCounter = register_int_counter!(
        "release_messages_scanned_total",
        "Release messages delivered to listeners by the scanner"
    )
    .expect("metric can not be created");

    pub static ref RETENTION_MESSAGES_DELETED: IntCounter = register_int_counter!(
        "retention_messages_deleted_total",
        "Superseded release messages removed by retention cleanup"
    )
    .expect("metric can not be created");

    pub static ref AUDIT_EVENTS_ACCEPTED: IntCounter = register_int_counter!(
        "audit_events_accepted_total",
        "Delivery observations accepted onto the audit queue"
    )
    .expect("metric can not be created");

    pub static ref AUDIT_EVENTS_DROPPED: IntCounter = register_int_counter!(
        "audit_events_dropped_total",
        "Delivery observations dropped because the audit queue was full"
    )
    .expect("metric can not be created");

    pub static ref AUDIT_RECORDS_WRITTEN: IntCounter = register_int_counter!(
        "audit_records_written_total",
        "Instance delivery records created or updated in storage"
    )
    .expect("metric can not be created");
}
