//! Typed Bigtable resource names.
//!
//! Resource paths should not start with a "/": a [TableName] renders as
//! `projects/{project}/instances/{instance}/tables/{table}`.
use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid {kind} resource name: {name:?}")]
pub struct PathError {
    kind: &'static str,
    name: String,
}

impl PathError {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

macro_rules! resource_name {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident => $collection:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            $($field: String),+
        }

        impl $name {
            /// Ids must be non-empty and must not contain a "/", otherwise
            /// the rendered name won't parse back
            pub fn new($($field: impl Into<String>),+) -> Self {
                let name = Self {
                    $($field: $field.into()),+
                };
                $(
                    debug_assert!(
                        is_valid_id(&name.$field),
                        "Invalid {} id: {:?}",
                        stringify!($field),
                        name.$field
                    );
                )+
                name
            }

            $(
                pub fn $field(&self) -> &str {
                    &self.$field
                }
            )+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let segments: &[(&str, &str)] = &[$(($collection, self.$field.as_str())),+];
                for (i, (collection, id)) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    write!(f, "{}/{}", collection, id)?;
                }
                Ok(())
            }
        }

        impl FromStr for $name {
            type Err = PathError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut segments = s.split('/');
                $(
                    let $field = match (segments.next(), segments.next()) {
                        (Some($collection), Some(id)) if is_valid_id(id) => id.to_owned(),
                        _ => return Err(PathError::new(stringify!($name), s)),
                    };
                )+
                if segments.next().is_some() {
                    return Err(PathError::new(stringify!($name), s));
                }
                Ok(Self { $($field),+ })
            }
        }
    };
}

resource_name!(
    /// `projects/{project}`
    ProjectName { project => "projects" }
);

resource_name!(
    /// `projects/{project}/instances/{instance}`
    InstanceName {
        project => "projects",
        instance => "instances",
    }
);

resource_name!(
    /// `projects/{project}/instances/{instance}/tables/{table}`
    TableName {
        project => "projects",
        instance => "instances",
        table => "tables",
    }
);

resource_name!(
    /// `projects/{project}/instances/{instance}/appProfiles/{app_profile}`
    AppProfileName {
        project => "projects",
        instance => "instances",
        app_profile => "appProfiles",
    }
);

impl ProjectName {
    pub fn instance(&self, instance: impl Into<String>) -> InstanceName {
        InstanceName::new(self.project.clone(), instance)
    }
}

impl InstanceName {
    pub fn project_name(&self) -> ProjectName {
        ProjectName::new(self.project.clone())
    }

    pub fn table(&self, table: impl Into<String>) -> TableName {
        TableName::new(self.project.clone(), self.instance.clone(), table)
    }

    pub fn app_profile(&self, app_profile: impl Into<String>) -> AppProfileName {
        AppProfileName::new(self.project.clone(), self.instance.clone(), app_profile)
    }
}

impl TableName {
    pub fn instance_name(&self) -> InstanceName {
        InstanceName::new(self.project.clone(), self.instance.clone())
    }
}

impl AppProfileName {
    pub fn instance_name(&self) -> InstanceName {
        InstanceName::new(self.project.clone(), self.instance.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppProfileName, InstanceName, PathError, ProjectName, TableName};

    const TABLE: &str = "projects/P/instances/I/tables/T";

    #[test]
    fn render() {
        assert_eq!(ProjectName::new("P").to_string(), "projects/P");
        assert_eq!(
            InstanceName::new("P", "I").to_string(),
            "projects/P/instances/I"
        );
        assert_eq!(TableName::new("P", "I", "T").to_string(), TABLE);
        assert_eq!(
            AppProfileName::new("P", "I", "A").to_string(),
            "projects/P/instances/I/appProfiles/A"
        );
    }

    #[test]
    fn render_is_idempotent() {
        let first = TableName::new("sync", "test", "rows").to_string();
        let second = TableName::new("sync", "test", "rows").to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_matches_ids() {
        let table: TableName = TABLE.parse().unwrap();
        assert_eq!(table.project(), "P");
        assert_eq!(table.instance(), "I");
        assert_eq!(table.table(), "T");
        assert_eq!(table.to_string(), TABLE);
        assert_eq!(table.instance_name().to_string(), "projects/P/instances/I");

        let profile: AppProfileName = "projects/P/instances/I/appProfiles/A".parse().unwrap();
        assert_eq!(profile.app_profile(), "A");
        assert_eq!(profile.instance_name().instance(), "I");
    }

    #[test]
    fn parse_rejects_malformed() {
        for name in [
            "",
            "projects/P",
            "projects/P/instances/I/tables",
            "projects/P/instances/I/tables/",
            "projects/P/instances/I/tables/T/extra",
            "/projects/P/instances/I/tables/T",
            "projects/P/clusters/I/tables/T",
        ] {
            assert!(name.parse::<TableName>().is_err(), "{}", name);
        }
        let err: PathError = "projects/P/instances/I".parse::<TableName>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid TableName resource name: \"projects/P/instances/I\""
        );
    }

    #[test]
    fn children() {
        let instance = ProjectName::new("P").instance("I");
        assert_eq!(instance.table("T").to_string(), TABLE);
        assert_eq!(instance.project_name().project(), "P");
        assert_eq!(
            instance.app_profile("A").to_string(),
            "projects/P/instances/I/appProfiles/A"
        );
    }

    #[test]
    fn rendered_names_parse_back() {
        for table in [
            TableName::new("P", "I", "T"),
            TableName::new("my-project", "prod", "user_events"),
        ] {
            assert_eq!(table.to_string().parse::<TableName>().unwrap(), table);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Invalid table id")]
    fn new_rejects_slash_in_id() {
        TableName::new("P", "I", "a/b");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Invalid project id")]
    fn new_rejects_empty_id() {
        ProjectName::new("");
    }
}
