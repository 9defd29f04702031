diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password_hash -> Text,
        role -> Text,               // admin | user
    }
}

diesel::table! {
    bitacora (id) {
        id -> Integer,
        actor -> Text,                      // who did it, "unknown" without a session
        entered_at -> Timestamp,            // set by the database on insert
        left_at -> Nullable<Timestamp>,     // only ever set on LOGIN entries, once
        client_label -> Text,
        source_address -> Text,
        source_host -> Text,
        affected_table -> Text,             // e.g. players, teams, matches
        action_kind -> Text,                // INSERT | UPDATE | DELETE | LOGIN | ...
        description -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    bitacora,
);
