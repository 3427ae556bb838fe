//! Read rows from, or sample the row keys of, a Bigtable table
#[macro_use]
extern crate slog_scope;

use std::error::Error;

use bigtable_client::{
    bigtable::{ReadRowsRequest, SampleRowKeysRequest},
    logging::{init_logging, reset_logging},
    BigtableClient, ClientError,
};
use bigtable_common::ReportableError;
use bigtable_settings::Settings;
use docopt::Docopt;
use futures::{executor::block_on, TryStreamExt};
use serde_derive::Deserialize;

const USAGE: &str = "
Usage:
    bigtable_rows read-rows <table> [--limit=<n>] [--config=CONFIGFILE]
    bigtable_rows sample-keys <table> [--config=CONFIGFILE]
    bigtable_rows (-h | --help)

Options:
    -h, --help               Show this message.
    --limit=<n>              Max number of rows to read, 0 for all [default: 0].
    --config=CONFIGFILE      Client configuration file path.
";

#[derive(Debug, Deserialize)]
struct Args {
    cmd_read_rows: bool,
    cmd_sample_keys: bool,
    arg_table: String,
    flag_limit: i64,
    flag_config: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let settings = Settings::with_env_and_config_file(args.flag_config.as_deref())?;
    init_logging(!settings.human_logs)?;
    info!("Connecting to {}", settings.banner());

    let result = block_on(run(&args, &settings));
    if let Err(e) = &result {
        error!("{}", e; "label" => e.error_label());
        if let Some(backtrace) = e.backtrace() {
            debug!("{:?}", backtrace);
        }
    }
    reset_logging();
    Ok(result?)
}

async fn run(args: &Args, settings: &Settings) -> Result<(), ClientError> {
    let client = BigtableClient::from_settings(settings)?;
    let table_name = client
        .table_name(&args.arg_table)
        .ok_or_else(|| ClientError::config("No instance configured"))?
        .to_string();
    let app_profile_id = client.app_profile_id().unwrap_or_default().to_owned();

    if args.cmd_read_rows {
        let mut req = ReadRowsRequest::new();
        req.set_table_name(table_name);
        req.set_app_profile_id(app_profile_id);
        req.set_rows_limit(args.flag_limit);

        let mut responses = client.read_rows(&req);
        let mut chunks = 0;
        while let Some(resp) = responses.try_next().await? {
            for chunk in resp.get_chunks() {
                chunks += 1;
                println!(
                    "{}\t{}:{}\t{}",
                    String::from_utf8_lossy(chunk.get_row_key()),
                    chunk.get_family_name().get_value(),
                    String::from_utf8_lossy(chunk.get_qualifier().get_value()),
                    String::from_utf8_lossy(chunk.get_value()),
                );
            }
        }
        info!("Read {} cell chunks", chunks);
    } else if args.cmd_sample_keys {
        let mut req = SampleRowKeysRequest::new();
        req.set_table_name(table_name);
        req.set_app_profile_id(app_profile_id);

        let samples: Vec<_> = client.sample_row_keys(&req).try_collect().await?;
        for sample in &samples {
            println!(
                "{}\t{}",
                String::from_utf8_lossy(sample.get_row_key()),
                sample.get_offset_bytes()
            );
        }
        info!("Sampled {} row keys", samples.len());
    }
    Ok(())
}
