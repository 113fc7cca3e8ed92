//! Diesel schema for assignment persistence.

diesel::table! {
    /// Task assignment rows; never physically deleted.
    task_assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Task reference.
        task_id -> Uuid,
        /// Volunteer reference.
        volunteer_id -> Uuid,
        /// Invitation lifecycle status.
        #[max_length = 20]
        notification_status -> Varchar,
        /// Work execution status.
        #[max_length = 20]
        work_status -> Varchar,
        /// Dispatch timestamp.
        sent_at -> Nullable<Timestamptz>,
        /// Response timestamp.
        responded_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
