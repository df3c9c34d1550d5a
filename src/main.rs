use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use linkhub::App;
use linkhub::api::{self, AppState};
use linkhub::bridge::{BINDINGS, FormBridge, StaticPage, Surface};
use linkhub::client::{Catalog, HttpFetch};
use linkhub::config::Config;
use linkhub::extract::LinkExtractor;

/// Movie link aggregation service and its form bridge.
#[derive(Parser)]
#[clap(version, about)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Listen address, e.g. 0.0.0.0:8000.
        #[clap(long)]
        addr: Option<SocketAddr>,
        /// Path to a TOML config file.
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Submit a form against a running instance and print the response.
    Submit {
        /// Form identifier, e.g. search-form.
        form: String,
        /// Fields as name=value pairs.
        fields: Vec<String>,
        /// Base URL of the running instance.
        #[clap(long, default_value = "http://127.0.0.1:8000")]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> linkhub::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Serve { addr, config } => serve(addr, config).await,
        Command::Submit {
            form,
            fields,
            base_url,
        } => submit(form, fields, base_url).await,
    }
}

async fn serve(addr: Option<SocketAddr>, config: Option<PathBuf>) -> linkhub::Result<()> {
    let mut config = Config::load(config.as_deref())?;
    if let Some(addr) = addr {
        config.addr = addr;
    }
    let addr = config.addr;

    let state = AppState {
        catalog: Catalog::new(),
        extractor: LinkExtractor::new()?,
        config,
    };
    let mut app = App::new(state);
    api::routes(&mut app);
    app.listen(addr).await
}

async fn submit(form: String, fields: Vec<String>, base_url: String) -> linkhub::Result<()> {
    let fields = parse_fields(&fields)?;

    let mut page = StaticPage::new();
    for binding in BINDINGS {
        page.add_form(binding.form);
        page.add_surface(binding.container, Arc::new(ConsoleSurface));
    }

    let bridge = FormBridge::attach(BINDINGS, &page, Arc::new(HttpFetch::new(base_url)));
    if !bridge.bound_forms().any(|bound| bound == form) {
        return Err(linkhub::Error::from(format!(
            "unknown form `{}`; expected one of src-form, search-form, download-links-form, final-links-form",
            form
        )));
    }

    bridge.submit(&form, &fields).await;
    Ok(())
}

fn parse_fields(raw: &[String]) -> linkhub::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| linkhub::Error::from(format!("field `{}` is not name=value", pair)))
        })
        .collect()
}

/// Prints each surface transition, matching what the page would display.
struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn set_text(&self, text: &str) {
        println!("{}", text);
    }
}
