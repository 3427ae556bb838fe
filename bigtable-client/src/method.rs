use std::{fmt, time::Duration};

/// How many responses a [Method] produces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Unary,
    ServerStreaming,
}

/// The RPCs of the `google.bigtable.v2.Bigtable` service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    ReadRows,
    SampleRowKeys,
    MutateRow,
    MutateRows,
    CheckAndMutateRow,
    ReadModifyWriteRow,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::ReadRows,
        Method::SampleRowKeys,
        Method::MutateRow,
        Method::MutateRows,
        Method::CheckAndMutateRow,
        Method::ReadModifyWriteRow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::ReadRows => "ReadRows",
            Method::SampleRowKeys => "SampleRowKeys",
            Method::MutateRow => "MutateRow",
            Method::MutateRows => "MutateRows",
            Method::CheckAndMutateRow => "CheckAndMutateRow",
            Method::ReadModifyWriteRow => "ReadModifyWriteRow",
        }
    }

    /// The fully qualified gRPC method path
    pub fn path(self) -> &'static str {
        match self {
            Method::ReadRows => "/google.bigtable.v2.Bigtable/ReadRows",
            Method::SampleRowKeys => "/google.bigtable.v2.Bigtable/SampleRowKeys",
            Method::MutateRow => "/google.bigtable.v2.Bigtable/MutateRow",
            Method::MutateRows => "/google.bigtable.v2.Bigtable/MutateRows",
            Method::CheckAndMutateRow => "/google.bigtable.v2.Bigtable/CheckAndMutateRow",
            Method::ReadModifyWriteRow => "/google.bigtable.v2.Bigtable/ReadModifyWriteRow",
        }
    }

    pub fn kind(self) -> CallKind {
        match self {
            Method::ReadRows | Method::SampleRowKeys | Method::MutateRows => {
                CallKind::ServerStreaming
            }
            Method::MutateRow | Method::CheckAndMutateRow | Method::ReadModifyWriteRow => {
                CallKind::Unary
            }
        }
    }

    /// The deadline used when the caller doesn't supply one. Matches the
    /// service's published client configuration.
    pub fn default_timeout(self) -> Duration {
        let millis = match self {
            // Full table scans may legitimately run for hours
            Method::ReadRows => 43_200_000,
            Method::SampleRowKeys => 60_000,
            Method::MutateRow => 60_000,
            Method::MutateRows => 600_000,
            Method::CheckAndMutateRow => 20_000,
            Method::ReadModifyWriteRow => 20_000,
        };
        Duration::from_millis(millis)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CallKind, Method};

    #[test]
    fn paths_end_with_name() {
        for method in Method::ALL.iter() {
            assert!(method.path().starts_with("/google.bigtable.v2.Bigtable/"));
            assert!(method.path().ends_with(method.name()));
            assert_eq!(method.to_string(), method.name());
        }
    }

    #[test]
    fn kinds() {
        let streaming: Vec<_> = Method::ALL
            .iter()
            .filter(|m| m.kind() == CallKind::ServerStreaming)
            .collect();
        assert_eq!(
            streaming,
            vec![&Method::ReadRows, &Method::SampleRowKeys, &Method::MutateRows]
        );
    }

    #[test]
    fn default_timeouts() {
        assert_eq!(
            Method::ReadRows.default_timeout(),
            Duration::from_secs(12 * 60 * 60)
        );
        assert_eq!(
            Method::CheckAndMutateRow.default_timeout(),
            Duration::from_secs(20)
        );
    }
}
