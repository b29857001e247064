/* src/router/backend/rust/src/resource.rs */

use std::sync::Arc;

use serde_json::Value;
use waypoint_router::{
  ActionArgs, ActionDef, ActionOutcome, HandlerRegistry, LoaderArgs, LoaderDef, Method, RouterError,
  message_from_body,
};

use crate::client::ResourceClient;

/// A REST collection exposed by the backend: `Resource::new("event")` is
/// served at `/events` and `/events/{id}`, with list bodies shaped
/// `{"events": [...]}` and item bodies `{"event": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
  singular: String,
  plural: String,
}

impl Resource {
  pub fn new(singular: impl Into<String>) -> Self {
    let singular = singular.into();
    let plural = if singular.ends_with('s') { singular.clone() } else { format!("{singular}s") };
    Self { singular, plural }
  }

  /// Override the derived collection name.
  pub fn with_collection(mut self, plural: impl Into<String>) -> Self {
    self.plural = plural.into();
    self
  }

  pub fn singular(&self) -> &str {
    &self.singular
  }

  pub fn plural(&self) -> &str {
    &self.plural
  }

  /// Route param carrying the item id (`eventId`).
  pub fn id_param(&self) -> String {
    format!("{}Id", self.singular)
  }

  pub fn collection_path(&self) -> String {
    format!("/{}", self.plural)
  }

  pub fn item_path(&self, id: &str) -> String {
    format!("/{}/{id}", self.plural)
  }

  /// Name the mutation action is registered under (`events.mutate`).
  pub fn action_name(&self) -> String {
    format!("{}.mutate", self.plural)
  }

  fn fetch_error(&self) -> String {
    format!("Could not fetch {}.", self.plural)
  }

  fn save_error(&self) -> String {
    format!("Could not save {}.", self.singular)
  }

  fn item_id(&self, params: &waypoint_router::Params) -> Option<String> {
    params.get(&self.id_param()).or_else(|| params.get("id")).cloned()
  }

  /// `GET /{plural}`.
  pub fn collection_loader(&self, client: &ResourceClient) -> LoaderDef {
    let resource = Arc::new(self.clone());
    let client = client.clone();
    LoaderDef::eager(self.plural.clone(), move |_args: LoaderArgs| {
      let resource = resource.clone();
      let client = client.clone();
      async move {
        let resp = client.get(&resource.collection_path()).await?;
        resource.loaded(resp)
      }
    })
  }

  /// `GET /{plural}/{id}` with the id taken from the route params.
  pub fn item_loader(&self, client: &ResourceClient) -> LoaderDef {
    let resource = Arc::new(self.clone());
    let client = client.clone();
    LoaderDef::eager(self.singular.clone(), move |args: LoaderArgs| {
      let resource = resource.clone();
      let client = client.clone();
      async move {
        let Some(id) = resource.item_id(&args.params) else {
          return Err(RouterError::fetch_failed(
            400,
            format!("missing route param '{}'", resource.id_param()),
          ));
        };
        let resp = client.get(&resource.item_path(&id)).await?;
        resource.loaded(resp)
      }
    })
  }

  /// Create (`POST`), update (`PUT`/`PATCH`) or delete (`DELETE`).
  ///
  /// Creates and deletes redirect to the collection, updates to the item.
  /// A `422` response is handed back as action data.
  pub fn mutation_action(&self, client: &ResourceClient) -> ActionDef {
    let resource = Arc::new(self.clone());
    let client = client.clone();
    ActionDef::new(self.action_name(), move |args: ActionArgs| {
      let resource = resource.clone();
      let client = client.clone();
      async move { resource.mutate(&client, args).await }
    })
  }

  async fn mutate(&self, client: &ResourceClient, args: ActionArgs) -> Result<ActionOutcome, RouterError> {
    let id = self.item_id(&args.params);
    let (path, redirect) = match (args.method, id) {
      (Method::Post, _) => (self.collection_path(), self.collection_path()),
      (Method::Delete, Some(id)) => (self.item_path(&id), self.collection_path()),
      (Method::Put | Method::Patch, Some(id)) => (self.item_path(&id), self.item_path(&id)),
      (method, None) => {
        return Err(RouterError::action_failed(
          400,
          format!("{method} needs route param '{}'", self.id_param()),
        ));
      }
    };

    let resp = client
      .send(args.method, &path, &args.payload, args.encoding)
      .await
      .map_err(RouterError::into_action_failed)?;
    if resp.status == 422 {
      return Ok(ActionOutcome::Data(resp.body));
    }
    if !resp.is_success() {
      let message = message_from_body(&resp.body, &self.save_error());
      return Err(RouterError::action_failed(resp.status, message).with_payload(resp.body));
    }
    Ok(ActionOutcome::Redirect(redirect))
  }

  fn loaded(&self, resp: crate::client::Response) -> Result<Value, RouterError> {
    if resp.is_success() {
      return Ok(resp.body);
    }
    let message = message_from_body(&resp.body, &self.fetch_error());
    Err(RouterError::fetch_failed(resp.status, message).with_payload(resp.body))
  }
}

/// Register the collection loader, item loader and mutation action of
/// `resource` under `{plural}`, `{singular}` and `{plural}.mutate`.
pub fn register_resource(registry: &mut HandlerRegistry, client: &ResourceClient, resource: &Resource) {
  registry.insert_loader(resource.collection_loader(client));
  registry.insert_loader(resource.item_loader(client));
  registry.insert_action(resource.mutation_action(client));
}
