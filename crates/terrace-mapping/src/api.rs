//! Store-backed resource APIs.
//!
//! The five capability traits each cover one conventional REST operation
//! over a [`RecordStore`]. [`StoreApi`] implements all of them via its
//! mapping and exposes whichever subset its builder enabled, composing them
//! into a [`ResourceApi`] without any inheritance: a capability that is not
//! enabled is simply never routed.

use std::future::ready;

use http::StatusCode;
use serde_json::Value;

use terrace_core::{codes, ApiError, ApiRequest, ApiResult, ErrorBody, Listing};
use terrace_dispatch::{decode_body, HandlerFuture, Outcome, ResourceApi};
use terrace_routes::{PathParams, Route, RouteSet};

use crate::factory::MappedSchema;
use crate::record::{RecordStore, RecordType};
use crate::schema::MappedResource;

/// Listing over a record collection.
pub trait SupportsList: Send + Sync {
    /// Returns one page of resources plus the total collection size.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; storage failures surface as internal errors.
    fn list_records(
        &self,
        request: &ApiRequest,
        offset: u32,
        limit: u32,
    ) -> ApiResult<(Vec<Value>, Option<u64>)>;
}

/// Creation of a record from a request body.
pub trait SupportsCreate: Send + Sync {
    /// Decodes, validates and persists a new record; returns its resource.
    ///
    /// # Errors
    ///
    /// Validation and body decoding failures, or storage errors.
    fn create_record(&self, request: &ApiRequest) -> ApiResult<Value>;
}

/// Retrieval of a single record.
pub trait SupportsRetrieve: Send + Sync {
    /// Fetches the record with the given identifier as a resource.
    ///
    /// # Errors
    ///
    /// A not-found error when no record has the identifier.
    fn retrieve_record(&self, request: &ApiRequest, id: i64) -> ApiResult<Value>;
}

/// Update of a single record from a request body.
pub trait SupportsUpdate: Send + Sync {
    /// Decodes, validates and applies an update; returns the updated
    /// resource.
    ///
    /// # Errors
    ///
    /// Not-found, validation and storage errors.
    fn update_record(&self, request: &ApiRequest, id: i64) -> ApiResult<Value>;
}

/// Deletion of a single record.
pub trait SupportsDelete: Send + Sync {
    /// Deletes the record with the given identifier.
    ///
    /// # Errors
    ///
    /// A not-found error when no record has the identifier.
    fn delete_record(&self, request: &ApiRequest, id: i64) -> ApiResult<()>;
}

/// Which capabilities a [`StoreApi`] exposes.
#[derive(Debug, Clone, Copy, Default)]
struct Capabilities {
    list: bool,
    create: bool,
    retrieve: bool,
    update: bool,
    delete: bool,
}

/// A [`ResourceApi`] over a record store and a derived mapping.
///
/// # Example
///
/// ```rust,ignore
/// let api = StoreApi::builder(store, mapping)
///     .with_list()
///     .with_retrieve()
///     .build();
/// let endpoint = Endpoint::new(api);
/// ```
pub struct StoreApi<S: RecordStore> {
    name: String,
    store: S,
    mapping: MappedSchema,
    capabilities: Capabilities,
    default_offset: u32,
    default_limit: u32,
    lazy_updates: bool,
}

impl<S: RecordStore> StoreApi<S> {
    /// Creates a builder over a store and mapping.
    #[must_use]
    pub fn builder(store: S, mapping: MappedSchema) -> StoreApiBuilder<S> {
        StoreApiBuilder::new(store, mapping)
    }

    /// Fetches a record or fails with the conventional not-found error.
    fn get_instance(&self, id: i64) -> ApiResult<S::Rec> {
        self.store.get(id).ok_or_else(|| {
            ApiError::not_found(format!("No {} with id {}.", self.mapping.record_name(), id))
        })
    }

    /// Decodes the request body into a validated resource.
    fn resource_from_body(&self, request: &ApiRequest) -> ApiResult<MappedResource> {
        let value = decode_body(request)?;
        if value.is_array() {
            return Err(ApiError::Immediate {
                status: StatusCode::BAD_REQUEST,
                error: ErrorBody::new(
                    400,
                    codes::MULTIPLE_RESOURCES,
                    "Expected a single resource not a list.",
                ),
                headers: Vec::new(),
            });
        }

        let mut resource = MappedResource::from_value(self.mapping.schema(), value)?;
        resource.full_clean()?;
        Ok(resource)
    }

    /// Parses the identifier path parameter.
    fn parse_id(&self, params: &PathParams) -> ApiResult<i64> {
        let raw = params.get("resource_id").unwrap_or_default();
        raw.parse().map_err(|_| {
            ApiError::not_found(format!(
                "No {} with id {raw}.",
                self.mapping.record_name()
            ))
        })
    }
}

impl<S: RecordStore> SupportsList for StoreApi<S> {
    fn list_records(
        &self,
        _request: &ApiRequest,
        offset: u32,
        limit: u32,
    ) -> ApiResult<(Vec<Value>, Option<u64>)> {
        let records = self.store.all();
        let total = records.len() as u64;
        let page = records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|record| self.mapping.forward(&record).to_value())
            .collect();
        Ok((page, Some(total)))
    }
}

impl<S: RecordStore> SupportsCreate for StoreApi<S> {
    fn create_record(&self, request: &ApiRequest) -> ApiResult<Value> {
        let resource = self.resource_from_body(request)?;
        let record = self.mapping.save(&resource, &self.store, true)?;
        Ok(self.mapping.forward(&record).to_value())
    }
}

impl<S: RecordStore> SupportsRetrieve for StoreApi<S> {
    fn retrieve_record(&self, _request: &ApiRequest, id: i64) -> ApiResult<Value> {
        let record = self.get_instance(id)?;
        Ok(self.mapping.forward(&record).to_value())
    }
}

impl<S: RecordStore> SupportsUpdate for StoreApi<S> {
    fn update_record(&self, request: &ApiRequest, id: i64) -> ApiResult<Value> {
        let mut record = self.get_instance(id)?;
        let resource = self.resource_from_body(request)?;
        self.mapping
            .update(&resource, &mut record, &self.store, self.lazy_updates, true)?;
        Ok(self.mapping.forward(&record).to_value())
    }
}

impl<S: RecordStore> SupportsDelete for StoreApi<S> {
    fn delete_record(&self, _request: &ApiRequest, id: i64) -> ApiResult<()> {
        if self.store.delete(id)? {
            Ok(())
        } else {
            Err(ApiError::not_found(format!(
                "No {} with id {}.",
                self.mapping.record_name(),
                id
            )))
        }
    }
}

impl<S: RecordStore> ResourceApi for StoreApi<S> {
    fn api_name(&self) -> &str {
        &self.name
    }

    fn routes(&self) -> RouteSet {
        let mut routes = RouteSet::new();
        if self.capabilities.list {
            routes = routes.route(Route::listing("object_list"));
        }
        if self.capabilities.create {
            routes = routes.route(Route::create("object_create"));
        }
        if self.capabilities.retrieve {
            routes = routes.route(Route::detail("object_detail"));
        }
        if self.capabilities.update {
            routes = routes.route(Route::update("object_update"));
        }
        if self.capabilities.delete {
            routes = routes.route(Route::delete("object_delete"));
        }
        routes
    }

    fn invoke<'a>(
        &'a self,
        handler: &str,
        request: &'a ApiRequest,
        params: &'a PathParams,
    ) -> Option<HandlerFuture<'a>> {
        // The storage layer is a single opaque synchronous call, so each
        // handler runs eagerly and is wrapped in a ready future.
        let result = match handler {
            "object_list" if self.capabilities.list => {
                let offset = request
                    .query_param("offset")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(self.default_offset);
                let limit = request
                    .query_param("limit")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(self.default_limit);
                self.list_records(request, offset, limit)
                    .and_then(|(results, total)| {
                        let mut listing = Listing::new(results, limit, offset);
                        if let Some(total) = total {
                            listing = listing.with_total_count(total);
                        }
                        Outcome::resource(&listing)
                    })
            }
            "object_create" if self.capabilities.create => self
                .create_record(request)
                .map(|value| Outcome::WithStatus(value, StatusCode::CREATED)),
            "object_detail" if self.capabilities.retrieve => self
                .parse_id(params)
                .and_then(|id| self.retrieve_record(request, id))
                .map(Outcome::Resource),
            "object_update" if self.capabilities.update => self
                .parse_id(params)
                .and_then(|id| self.update_record(request, id))
                .map(Outcome::Resource),
            "object_delete" if self.capabilities.delete => self
                .parse_id(params)
                .and_then(|id| self.delete_record(request, id))
                .map(|()| Outcome::NoContent),
            _ => return None,
        };

        Some(Box::pin(ready(result)))
    }
}

/// Builder for [`StoreApi`].
pub struct StoreApiBuilder<S: RecordStore> {
    name: Option<String>,
    store: S,
    mapping: MappedSchema,
    capabilities: Capabilities,
    default_offset: u32,
    default_limit: u32,
    lazy_updates: bool,
}

impl<S: RecordStore> StoreApiBuilder<S> {
    /// Creates a builder with no capabilities enabled.
    #[must_use]
    pub fn new(store: S, mapping: MappedSchema) -> Self {
        Self {
            name: None,
            store,
            mapping,
            capabilities: Capabilities::default(),
            default_offset: 0,
            default_limit: 50,
            lazy_updates: true,
        }
    }

    /// Overrides the API name (defaults to the pluralized record name).
    #[must_use]
    pub fn api_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enables the listing capability.
    #[must_use]
    pub fn with_list(mut self) -> Self {
        self.capabilities.list = true;
        self
    }

    /// Enables the creation capability.
    #[must_use]
    pub fn with_create(mut self) -> Self {
        self.capabilities.create = true;
        self
    }

    /// Enables the retrieval capability.
    #[must_use]
    pub fn with_retrieve(mut self) -> Self {
        self.capabilities.retrieve = true;
        self
    }

    /// Enables the update capability.
    #[must_use]
    pub fn with_update(mut self) -> Self {
        self.capabilities.update = true;
        self
    }

    /// Enables the deletion capability.
    #[must_use]
    pub fn with_delete(mut self) -> Self {
        self.capabilities.delete = true;
        self
    }

    /// Enables every capability.
    #[must_use]
    pub fn with_all(self) -> Self {
        self.with_list()
            .with_create()
            .with_retrieve()
            .with_update()
            .with_delete()
    }

    /// Sets the default page size for listings.
    #[must_use]
    pub fn default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets the default offset for listings.
    #[must_use]
    pub fn default_offset(mut self, offset: u32) -> Self {
        self.default_offset = offset;
        self
    }

    /// Disables diff-based lazy updates; every update then writes.
    #[must_use]
    pub fn eager_updates(mut self) -> Self {
        self.lazy_updates = false;
        self
    }

    /// Builds the API.
    #[must_use]
    pub fn build(self) -> StoreApi<S> {
        let name = self
            .name
            .unwrap_or_else(|| format!("{}s", S::Rec::record_name()));
        StoreApi {
            name,
            store: self.store,
            mapping: self.mapping,
            capabilities: self.capabilities,
            default_offset: self.default_offset,
            default_limit: self.default_limit,
            lazy_updates: self.lazy_updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::SchemaBuilder;
    use crate::fields::{FieldKind, RecordField};
    use crate::memory::MemoryStore;
    use crate::record::Record;
    use serde_json::json;
    use std::collections::BTreeMap;

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

    fn api(capabilities: fn(StoreApiBuilder<MemoryStore<Widget>>) -> StoreApiBuilder<MemoryStore<Widget>>) -> StoreApi<MemoryStore<Widget>> {
        let mapping = SchemaBuilder::for_record::<Widget>().build();
        capabilities(StoreApi::builder(MemoryStore::new(), mapping)).build()
    }

    fn seeded_api() -> StoreApi<MemoryStore<Widget>> {
        let api = api(StoreApiBuilder::with_all);
        for (name, size) in [("spanner", 5), ("wrench", 7)] {
            let mut record = api.store.new_record();
            record.set_field("name", json!(name));
            record.set_field("size", json!(size));
            api.store.save(&mut record).unwrap();
        }
        api
    }

    fn request() -> ApiRequest {
        let mut request = ApiRequest::builder().uri("/widgets/").build();
        let codec = std::sync::Arc::new(terrace_negotiate::JsonCodec);
        request.bind_codecs(codec.clone(), codec, false);
        request
    }

    fn post(body: &str) -> ApiRequest {
        let mut request = ApiRequest::builder()
            .method(http::Method::POST)
            .uri("/widgets/")
            .body(body.to_string())
            .build();
        let codec = std::sync::Arc::new(terrace_negotiate::JsonCodec);
        request.bind_codecs(codec.clone(), codec, false);
        request
    }

    #[test]
    fn test_default_api_name_is_pluralized() {
        assert_eq!(api(StoreApiBuilder::with_all).api_name(), "widgets");
    }

    #[test]
    fn test_routes_reflect_capabilities() {
        let listing_only = api(StoreApiBuilder::with_list);
        assert_eq!(listing_only.routes().len(), 1);

        let full = api(StoreApiBuilder::with_all);
        assert_eq!(full.routes().len(), 5);
    }

    #[test]
    fn test_disabled_capability_not_invocable() {
        let listing_only = api(StoreApiBuilder::with_list);
        let request = request();
        let params = PathParams::new();
        assert!(listing_only
            .invoke("object_create", &request, &params)
            .is_none());
    }

    #[test]
    fn test_list_records_pages() {
        let api = seeded_api();
        let (page, total) = api.list_records(&request(), 0, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(total, Some(2));

        let (rest, _) = api.list_records(&request(), 1, 50).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0]["name"], "wrench");
    }

    #[test]
    fn test_create_record_validates() {
        let api = api(StoreApiBuilder::with_all);
        let err = api
            .create_record(&post(r#"{"size": 3}"#))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.sub_code(), codes::VALIDATION);
    }

    #[test]
    fn test_create_and_retrieve() {
        let api = api(StoreApiBuilder::with_all);
        let created = api
            .create_record(&post(r#"{"name": "spanner", "size": 5}"#))
            .unwrap();
        assert_eq!(created["name"], "spanner");

        let fetched = api.retrieve_record(&request(), 1).unwrap();
        assert_eq!(fetched["name"], "spanner");
    }

    #[test]
    fn test_retrieve_missing_is_not_found() {
        let api = api(StoreApiBuilder::with_all);
        let err = api.retrieve_record(&request(), 999).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_update_record() {
        let api = seeded_api();
        let updated = api
            .update_record(&post(r#"{"name": "spanner", "size": 9}"#), 1)
            .unwrap();
        assert_eq!(updated["size"], 9);
        assert_eq!(
            api.store.get(1).unwrap().get_field("size"),
            Some(json!(9))
        );
    }

    #[test]
    fn test_delete_record() {
        let api = seeded_api();
        api.delete_record(&request(), 1).unwrap();
        assert!(api.store.get(1).is_none());
        let err = api.delete_record(&request(), 1).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_create_rejects_list_body() {
        let api = api(StoreApiBuilder::with_all);
        let err = api
            .create_record(&post(r#"[{"name": "a"}]"#))
            .unwrap_err();
        assert_eq!(err.sub_code(), codes::MULTIPLE_RESOURCES);
    }
}
