//! Diesel schema for notification record persistence.

diesel::table! {
    /// One row per delivery attempt; resends append new rows.
    notification_records (id) {
        /// Record identifier.
        id -> Uuid,
        /// Assignment reference.
        assignment_id -> Uuid,
        /// Addressee.
        volunteer_id -> Uuid,
        /// Delivery channel.
        #[max_length = 20]
        channel -> Varchar,
        /// Subject line.
        subject -> Text,
        /// Rendered body.
        body -> Text,
        /// Embedded response token, when the channel carries one.
        response_token -> Nullable<Text>,
        /// Delivery timestamp.
        delivered_at -> Timestamptz,
        /// Read timestamp.
        read_at -> Nullable<Timestamptz>,
    }
}
