//! App builder and shared state

use axum::{middleware, routing::any, Extension, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use restgate_core::{
	AccessHierarchy, DeserializerRegistry, EntityType, EntityTypeBuilder, GateSettings,
	SerializerRegistry,
};
use restgate_types::store_adapter::StoreAdapter;

use crate::prelude::*;
use crate::{handler, middleware as mw};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	/// A single record
	Item,
	/// An ordered, filterable list of records
	Collection,
}

/// Binding of a route to an entity type.
#[derive(Debug, Clone)]
pub struct Resource {
	pub entity: Box<str>,
	pub kind: ResourceKind,
	/// Route parameter -> entity field, applied as equality criteria
	pub scope: Box<[(Box<str>, Box<str>)]>,
}

/// Immutable state shared by every request.
#[derive(Debug)]
pub struct AppState {
	pub settings: GateSettings,
	pub hierarchy: AccessHierarchy,
	pub serializers: SerializerRegistry,
	pub deserializers: DeserializerRegistry,
	pub store: Arc<dyn StoreAdapter>,
	pub entities: HashMap<Box<str>, Arc<EntityType>>,
}

impl AppState {
	/// Registered entity type by name.
	pub fn entity(&self, name: &str) -> RgResult<&Arc<EntityType>> {
		self.entities
			.get(name)
			.ok_or_else(|| Error::MisconfiguredServer(format!("entity '{}' is not registered", name)))
	}
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	settings: GateSettings,
	store: Option<Arc<dyn StoreAdapter>>,
	entities: Vec<EntityTypeBuilder>,
	routes: Vec<(Box<str>, Resource)>,
	toy_auth: bool,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Several apps may be built in one process (tests), so a subscriber
		// installed earlier is kept.
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			settings: GateSettings::default(),
			store: None,
			entities: Vec::new(),
			routes: Vec::new(),
			toy_auth: false,
		}
	}

	// Opts
	pub fn settings(&mut self, settings: GateSettings) -> &mut Self {
		self.settings = settings;
		self
	}
	pub fn store(&mut self, store: Arc<dyn StoreAdapter>) -> &mut Self {
		self.store = Some(store);
		self
	}
	/// Enable `?auth=<username>` authentication. Demos and tests only.
	pub fn toy_auth(&mut self, enabled: bool) -> &mut Self {
		self.toy_auth = enabled;
		self
	}

	// Entities and routes
	pub fn entity(&mut self, entity: EntityTypeBuilder) -> &mut Self {
		self.entities.push(entity);
		self
	}

	/// Expose single records of `entity` at `path`. `scope` maps route
	/// parameters to the fields they select on.
	pub fn item(&mut self, path: &str, entity: &str, scope: &[(&str, &str)]) -> &mut Self {
		self.route(path, entity, ResourceKind::Item, scope)
	}

	pub fn collection(&mut self, path: &str, entity: &str, scope: &[(&str, &str)]) -> &mut Self {
		self.route(path, entity, ResourceKind::Collection, scope)
	}

	fn route(
		&mut self,
		path: &str,
		entity: &str,
		kind: ResourceKind,
		scope: &[(&str, &str)],
	) -> &mut Self {
		let resource = Resource {
			entity: entity.into(),
			kind,
			scope: scope.iter().map(|(param, field)| ((*param).into(), (*field).into())).collect(),
		};
		self.routes.push((path.into(), resource));
		self
	}

	/// Validate the configuration and assemble state and router.
	pub fn build(self) -> RgResult<(App, Router)> {
		let settings = self.settings;
		settings.validate()?;
		let hierarchy = settings.hierarchy()?;
		let serializers = settings.serializer_registry()?;
		let deserializers = settings.deserializer_registry()?;

		let Some(store) = self.store else {
			error!("FATAL: No store adapter configured");
			return Err(Error::ConfigError("No store adapter configured".into()));
		};

		let mut entities = HashMap::new();
		for builder in self.entities {
			let entity = builder.build(&hierarchy)?;
			if entities.contains_key(&entity.name) {
				return Err(Error::ConfigError(format!("entity '{}' registered twice", entity.name)));
			}
			entities.insert(entity.name.clone(), Arc::new(entity));
		}

		for (idx, (path, resource)) in self.routes.iter().enumerate() {
			if !path.starts_with('/') {
				return Err(Error::ConfigError(format!("route '{}' must start with '/'", path)));
			}
			if self.routes[..idx].iter().any(|(p, _)| p == path) {
				return Err(Error::ConfigError(format!("route '{}' registered twice", path)));
			}
			let Some(entity) = entities.get(&resource.entity) else {
				return Err(Error::ConfigError(format!(
					"route '{}' refers to unknown entity '{}'",
					path, resource.entity
				)));
			};
			for (param, field) in &resource.scope {
				if !path.contains(&format!("{{{}}}", param)) {
					return Err(Error::ConfigError(format!(
						"route '{}' has no parameter '{}'",
						path, param
					)));
				}
				if !entity.policy.contains(field) {
					return Err(Error::ConfigError(format!(
						"route '{}' scopes on unknown field '{}' of '{}'",
						path, field, entity.name
					)));
				}
			}
		}

		let app = Arc::new(AppState { settings, hierarchy, serializers, deserializers, store, entities });

		let mut router = Router::new();
		for (path, resource) in self.routes {
			info!(path = %path, entity = %resource.entity, kind = ?resource.kind, "route");
			let method_router = match resource.kind {
				ResourceKind::Item => any(handler::item),
				ResourceKind::Collection => any(handler::collection),
			};
			router = router.route(&path, method_router.layer(Extension(Arc::new(resource))));
		}
		let mut router = router.fallback(handler::not_found).layer(middleware::from_fn(mw::method_override));
		if self.toy_auth {
			router = router.layer(middleware::from_fn_with_state(app.clone(), mw::toy_auth));
		}
		let router = router
			.layer(middleware::from_fn(mw::vary))
			.layer(TraceLayer::new_for_http())
			.with_state(app.clone());

		Ok((app, router))
	}

	pub async fn run(self, listen: &str) -> RgResult<()> {
		info!("restgate V{}", VERSION);
		let (_app, router) = self.build()?;

		let listener = tokio::net::TcpListener::bind(listen).await?;
		info!("Listening on {}", listen);
		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
