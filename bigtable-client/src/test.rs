use std::time::Duration;

use bigtable_settings::Settings;
use futures::{StreamExt, TryStreamExt};
use grpcio::RpcStatusCode;
use protobuf::RepeatedField;

use crate::{
    bigtable::{
        CheckAndMutateRowRequest, CheckAndMutateRowResponse, MutateRowRequest, MutateRowResponse,
        MutateRowsRequest, MutateRowsRequest_Entry, MutateRowsResponse, MutateRowsResponse_Entry,
        ReadModifyWriteRowRequest, ReadModifyWriteRowResponse, ReadRowsRequest, ReadRowsResponse,
        SampleRowKeysRequest, SampleRowKeysResponse,
    },
    data::{Mutation, Mutation_SetCell, ReadModifyWriteRule, Row, RowFilter},
    mock::MockTransport,
    path::TableName,
    BigtableClient, CallOptions, ClientErrorKind, Method, StreamState, TransportError,
};

fn client() -> BigtableClient<MockTransport> {
    BigtableClient::new(MockTransport::new())
}

fn table_name() -> String {
    TableName::new("P", "I", "T").to_string()
}

fn cancelled() -> TransportError {
    TransportError::new(1, "cancelled")
}

fn set_cell(value: &str) -> Mutation {
    let mut set_cell = Mutation_SetCell::new();
    set_cell.set_family_name("cf1".to_owned());
    set_cell.set_column_qualifier(b"greeting".to_vec());
    set_cell.set_timestamp_micros(-1);
    set_cell.set_value(value.as_bytes().to_vec());
    let mut mutation = Mutation::new();
    mutation.set_set_cell(set_cell);
    mutation
}

fn mutate_row_request() -> MutateRowRequest {
    let mut req = MutateRowRequest::new();
    req.set_table_name(table_name());
    req.set_row_key(b"122".to_vec());
    req.set_mutations(RepeatedField::from_vec(vec![]));
    req
}

fn check_and_mutate_row_request() -> CheckAndMutateRowRequest {
    let mut filter = RowFilter::new();
    filter.set_pass_all_filter(true);
    let mut req = CheckAndMutateRowRequest::new();
    req.set_table_name(table_name());
    req.set_row_key(b"-29".to_vec());
    req.set_predicate_filter(filter);
    req.set_true_mutations(RepeatedField::from_vec(vec![set_cell("matched")]));
    req.set_false_mutations(RepeatedField::from_vec(vec![set_cell("missed")]));
    req
}

fn read_modify_write_row_request() -> ReadModifyWriteRowRequest {
    let mut rule = ReadModifyWriteRule::new();
    rule.set_family_name("cf1".to_owned());
    rule.set_column_qualifier(b"counter".to_vec());
    rule.set_increment_amount(1);
    let mut req = ReadModifyWriteRowRequest::new();
    req.set_table_name(table_name());
    req.set_row_key(b"122".to_vec());
    req.set_rules(RepeatedField::from_vec(vec![rule]));
    req
}

fn mutate_rows_request() -> MutateRowsRequest {
    let entries = ["greeting0", "greeting1"]
        .iter()
        .map(|key| {
            let mut entry = MutateRowsRequest_Entry::new();
            entry.set_row_key(key.as_bytes().to_vec());
            entry.set_mutations(RepeatedField::from_vec(vec![set_cell(key)]));
            entry
        })
        .collect();
    let mut req = MutateRowsRequest::new();
    req.set_table_name(table_name());
    req.set_entries(RepeatedField::from_vec(entries));
    req
}

fn read_rows_request() -> ReadRowsRequest {
    let mut req = ReadRowsRequest::new();
    req.set_table_name(table_name());
    req.set_rows_limit(10);
    req
}

fn sample_row_keys_request() -> SampleRowKeysRequest {
    let mut req = SampleRowKeysRequest::new();
    req.set_table_name(table_name());
    req.set_app_profile_id("batch".to_owned());
    req
}

#[tokio::test]
async fn mutate_row() {
    let client = client();
    let req = mutate_row_request();
    let expected = MutateRowResponse::new();
    client.transport().mutate_row.returns(Ok(expected.clone()));

    let resp = client.mutate_row(&req).await.unwrap();
    assert_eq!(resp, expected);
    assert_eq!(client.transport().mutate_row.requests(), vec![req]);
}

#[tokio::test]
async fn mutate_row_error() {
    let client = client();
    let req = mutate_row_request();
    client.transport().mutate_row.returns(Err(cancelled()));

    let err = client.mutate_row(&req).await.unwrap_err();
    assert_eq!(err.code(), RpcStatusCode::CANCELLED);
    assert_eq!(err, cancelled());
    assert_eq!(client.transport().mutate_row.requests(), vec![req]);
}

#[tokio::test]
async fn check_and_mutate_row() {
    let client = client();
    let req = check_and_mutate_row_request();
    let mut expected = CheckAndMutateRowResponse::new();
    expected.set_predicate_matched(true);
    client
        .transport()
        .check_and_mutate_row
        .returns(Ok(expected.clone()));

    let resp = client.check_and_mutate_row(&req).await.unwrap();
    assert_eq!(resp, expected);
    assert!(resp.get_predicate_matched());
    assert_eq!(client.transport().check_and_mutate_row.requests(), vec![req]);
}

#[tokio::test]
async fn check_and_mutate_row_error() {
    let client = client();
    let req = check_and_mutate_row_request();
    client
        .transport()
        .check_and_mutate_row
        .returns(Err(cancelled()));

    let err = client.check_and_mutate_row(&req).await.unwrap_err();
    assert_eq!(err.code(), RpcStatusCode::CANCELLED);
    assert_eq!(client.transport().check_and_mutate_row.requests(), vec![req]);
}

#[tokio::test]
async fn read_modify_write_row() {
    let client = client();
    let req = read_modify_write_row_request();
    let mut row = Row::new();
    row.set_key(b"122".to_vec());
    let mut expected = ReadModifyWriteRowResponse::new();
    expected.set_row(row);
    client
        .transport()
        .read_modify_write_row
        .returns(Ok(expected.clone()));

    let resp = client.read_modify_write_row(&req).await.unwrap();
    assert_eq!(resp, expected);
    assert_eq!(client.transport().read_modify_write_row.requests(), vec![req]);
}

#[tokio::test]
async fn read_modify_write_row_error() {
    let client = client();
    let req = read_modify_write_row_request();
    client
        .transport()
        .read_modify_write_row
        .returns(Err(cancelled()));

    let err = client.read_modify_write_row(&req).await.unwrap_err();
    assert_eq!(err.code(), RpcStatusCode::CANCELLED);
    assert_eq!(err.message(), "cancelled");
}

#[tokio::test]
async fn unary_empty_response_is_relayed_as_produced() {
    // Unprogrammed mock calls produce the (empty) default response
    let client = client();
    let resp = client
        .read_modify_write_row(&read_modify_write_row_request())
        .await
        .unwrap();
    assert_eq!(resp, ReadModifyWriteRowResponse::new());
    assert!(!resp.has_row());
}

#[tokio::test]
async fn read_rows() {
    let client = client();
    let req = read_rows_request();
    let mut expected = ReadRowsResponse::new();
    expected.set_last_scanned_row_key(b"-126".to_vec());
    client.transport().read_rows.emits(vec![expected.clone()]);

    let responses = client.read_rows(&req);
    assert_eq!(client.transport().read_rows.call_count(), 0);
    let items: Vec<_> = responses.collect().await;

    assert_eq!(items, vec![Ok(expected)]);
    assert_eq!(client.transport().read_rows.requests(), vec![req]);
}

#[tokio::test]
async fn read_rows_error() {
    let client = client();
    client.transport().read_rows.fails(cancelled());

    let items: Vec<_> = client.read_rows(&read_rows_request()).collect().await;
    assert_eq!(items.len(), 1);
    let err = items[0].as_ref().unwrap_err();
    assert_eq!(err.code(), RpcStatusCode::CANCELLED);
}

#[tokio::test]
async fn sample_row_keys() {
    let client = client();
    let req = sample_row_keys_request();
    let keys: Vec<_> = [("a", 0), ("m", 1 << 20), ("", 2 << 20)]
        .iter()
        .map(|(key, offset)| {
            let mut resp = SampleRowKeysResponse::new();
            resp.set_row_key(key.as_bytes().to_vec());
            resp.set_offset_bytes(*offset);
            resp
        })
        .collect();
    client.transport().sample_row_keys.emits(keys.clone());

    let resps: Vec<_> = client.sample_row_keys(&req).try_collect().await.unwrap();
    // Delivered in the order the transport produced them
    assert_eq!(resps, keys);
    assert_eq!(client.transport().sample_row_keys.requests(), vec![req]);
}

#[tokio::test]
async fn sample_row_keys_error() {
    let client = client();
    client.transport().sample_row_keys.fails(cancelled());

    let mut responses = client.sample_row_keys(&sample_row_keys_request());
    let err = responses.next().await.unwrap().unwrap_err();
    assert_eq!(err.code(), RpcStatusCode::CANCELLED);
    assert_eq!(responses.state(), StreamState::Terminated);
    assert!(responses.next().await.is_none());
}

#[tokio::test]
async fn mutate_rows() {
    let client = client();
    let req = mutate_rows_request();
    let expected: Vec<_> = (0..2)
        .map(|index| {
            let mut entry = MutateRowsResponse_Entry::new();
            entry.set_index(index);
            let mut resp = MutateRowsResponse::new();
            resp.set_entries(RepeatedField::from_vec(vec![entry]));
            resp
        })
        .collect();
    client.transport().mutate_rows.emits(expected.clone());

    let resps: Vec<_> = client.mutate_rows(&req).try_collect().await.unwrap();
    assert_eq!(resps, expected);
    assert_eq!(client.transport().mutate_rows.requests(), vec![req]);
}

#[tokio::test]
async fn mutate_rows_error() {
    let client = client();
    client.transport().mutate_rows.fails_to_start(cancelled());

    let responses = client.mutate_rows(&mutate_rows_request());
    assert_eq!(responses.state(), StreamState::Created);
    let items: Vec<_> = responses.collect().await;
    assert_eq!(items, vec![Err(cancelled())]);
    assert_eq!(client.transport().mutate_rows.call_count(), 1);
}

#[tokio::test]
async fn stream_error_after_data_stops_delivery() {
    let client = client();
    let mut first = ReadRowsResponse::new();
    first.set_last_scanned_row_key(b"a".to_vec());
    let mut after = ReadRowsResponse::new();
    after.set_last_scanned_row_key(b"z".to_vec());
    client
        .transport()
        .read_rows
        .yields(vec![Ok(first.clone()), Err(cancelled()), Ok(after)]);

    let items: Vec<_> = client.read_rows(&read_rows_request()).collect().await;
    assert_eq!(items, vec![Ok(first), Err(cancelled())]);
}

#[tokio::test]
async fn streams_are_independent() {
    let client = client();
    let mut resp = SampleRowKeysResponse::new();
    resp.set_row_key(b"k".to_vec());
    client.transport().sample_row_keys.emits(vec![resp.clone()]);

    let req = sample_row_keys_request();
    let first = client.sample_row_keys(&req);
    let second = client.sample_row_keys(&req);
    assert_eq!(client.transport().sample_row_keys.call_count(), 0);

    let second: Vec<_> = second.try_collect().await.unwrap();
    assert_eq!(client.transport().sample_row_keys.call_count(), 1);
    let first: Vec<_> = first.try_collect().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![resp]);
    assert_eq!(client.transport().sample_row_keys.call_count(), 2);
}

#[tokio::test]
async fn default_call_options() {
    let client = client();
    client.mutate_row(&mutate_row_request()).await.unwrap();
    let calls = client.transport().mutate_row.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, CallOptions::for_method(Method::MutateRow));
    assert_eq!(calls[0].1.timeout, Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn explicit_call_options_are_forwarded() {
    let client = client().with_timeout(Duration::from_secs(3));
    client
        .read_rows(&read_rows_request())
        .collect::<Vec<_>>()
        .await;
    assert_eq!(
        client.transport().read_rows.calls()[0].1.timeout,
        Some(Duration::from_secs(3))
    );

    let opt = CallOptions::default().header("x-test", "1");
    client
        .check_and_mutate_row_opt(&check_and_mutate_row_request(), opt.clone())
        .await
        .unwrap();
    assert_eq!(client.transport().check_and_mutate_row.calls()[0].1, opt);
}

#[test]
fn resource_helpers() {
    let client = client();
    assert_eq!(client.project_id(), None);
    assert!(client.table_name("T").is_none());

    let client = client
        .clone()
        .with_instance(TableName::new("P", "I", "T").instance_name());
    assert_eq!(client.project_id(), Some("P"));
    assert_eq!(client.table_name("T").unwrap().to_string(), table_name());
    assert_eq!(
        client.app_profile_name("batch").unwrap().to_string(),
        "projects/P/instances/I/appProfiles/batch"
    );
    assert_eq!(client.app_profile_id(), None);
}

#[test]
fn from_settings_requires_project_and_instance() {
    let err = BigtableClient::from_settings(&Settings::default()).unwrap_err();
    assert!(matches!(err.kind(), ClientErrorKind::Config(_)));

    let settings = Settings {
        project_id: "P".to_owned(),
        ..Default::default()
    };
    let err = BigtableClient::from_settings(&settings).unwrap_err();
    assert!(matches!(err.kind(), ClientErrorKind::Config(_)));

    let settings = Settings {
        instance_id: "I".to_owned(),
        ..Default::default()
    };
    let err = BigtableClient::from_settings(&settings).unwrap_err();
    assert!(matches!(err.kind(), ClientErrorKind::Config(_)));
}
