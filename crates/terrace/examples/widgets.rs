//! A store-backed widget API driven with synthetic requests.
//!
//! Run with:
//!
//! ```sh
//! cargo run --example widgets
//! ```

use std::collections::BTreeMap;

use http::Method;
use serde_json::{json, Value};

use terrace::prelude::*;

#[derive(Debug, Clone, Default)]
struct Widget {
    values: BTreeMap<String, Value>,
}

impl RecordType for Widget {
    fn record_name() -> &'static str {
        "widget"
    }

    fn record_fields() -> Vec<RecordField> {
        vec![
            RecordField::new("id", FieldKind::AutoId),
            RecordField::new("name", FieldKind::Char { max_length: Some(50) }),
            RecordField::new("size", FieldKind::Integer).nullable(),
        ]
    }
}

impl Record for Widget {
    fn get_field(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        self.values.insert(name.to_string(), value);
        true
    }
}

async fn show(endpoint: &Endpoint, request: ApiRequest) {
    let label = format!("{} {}", request.method(), request.uri());
    match endpoint.dispatch(request).await {
        Ok(response) => {
            let body = std::str::from_utf8(response.body()).unwrap_or("<binary>");
            println!("{label} -> {} {body}", response.status());
        }
        Err(error) => println!("{label} -> unhandled: {error}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store: MemoryStore<Widget> = MemoryStore::new();
    let mapping = SchemaBuilder::for_record::<Widget>().build();
    let api = StoreApi::builder(store, mapping).with_all().build();
    let endpoint = Endpoint::new(api);

    show(
        &endpoint,
        ApiRequest::builder()
            .method(Method::POST)
            .uri("/widgets/")
            .body(json!({"name": "spanner", "size": 5}).to_string())
            .build(),
    )
    .await;

    show(&endpoint, ApiRequest::builder().uri("/widgets/").build()).await;

    show(&endpoint, ApiRequest::builder().uri("/widgets/1/").build()).await;

    show(
        &endpoint,
        ApiRequest::builder()
            .method(Method::POST)
            .uri("/widgets/")
            .body(json!({"size": "large"}).to_string())
            .build(),
    )
    .await;

    show(
        &endpoint,
        ApiRequest::builder()
            .method(Method::OPTIONS)
            .uri("/widgets/1/")
            .build(),
    )
    .await;

    show(&endpoint, ApiRequest::builder().uri("/widgets/99/").build()).await;
}
