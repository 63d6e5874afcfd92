use uuid::Uuid;

macro_rules! surrogate_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh id. v7 keeps index pages roughly append-ordered.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

surrogate_id! {
    /// Strongly typed id for an upstream content provider.
    ProviderId
}

surrogate_id! {
    /// Strongly typed id for a movie row.
    ///
    /// Referenced by favorites and watch history; must never change once a
    /// movie has been reconciled, no matter how often the provider re-syncs.
    MovieId
}

surrogate_id! {
    /// Strongly typed id for a series (or anime) container row.
    SeriesId
}

surrogate_id! {
    /// Strongly typed id for a season row.
    SeasonId
}

surrogate_id! {
    /// Strongly typed id for an episode row.
    EpisodeId
}
