//! Diesel schema for points persistence.

diesel::table! {
    /// Append-only credit grants; a partial unique index on
    /// `assignment_id` enforces one completion grant per assignment.
    points_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Credited volunteer.
        volunteer_id -> Uuid,
        /// Granted point value.
        points -> Int4,
        /// Human-readable reason.
        reason -> Text,
        /// Grant source kind.
        #[max_length = 20]
        source -> Varchar,
        /// Assignment reference for completion grants.
        assignment_id -> Nullable<Uuid>,
        /// Task reference for completion grants.
        task_id -> Nullable<Uuid>,
        /// Grant timestamp.
        created_at -> Timestamptz,
    }
}
