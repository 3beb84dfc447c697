//! Diesel schema for project persistence.

diesel::table! {
    /// Project records.
    projects (id) {
        /// Internal project identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Globally unique slug.
        #[max_length = 100]
        slug -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Active flag.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
