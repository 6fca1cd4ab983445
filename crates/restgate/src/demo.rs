//! Demo entity types: users and their posts
//!
//! Used by the basic server and the integration tests.

use serde_json::{json, Value};

use restgate_core::{EntityType, EntityTypeBuilder, OwnerAuthorizer};
use restgate_types::store_adapter::StoreAdapter;

use crate::app::AppBuilder;
use crate::prelude::*;

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";

pub fn users() -> EntityTypeBuilder {
	EntityType::builder(USERS)
		.field("id", "r:staff+")
		.field("username", "r:all")
		.field("fullname", "rw:all")
		.field("email", "rw:owner+")
		.field("badges", "r:all,w:staff+")
		.field("is_staff", "r:staff+,w:admin+")
		.authorizer(OwnerAuthorizer::new("username"))
}

pub fn posts() -> EntityTypeBuilder {
	EntityType::builder(POSTS)
		.field("id", "r:all")
		.field("user", "r:none")
		.field("message", "r:all,w:owner+")
		.authorizer(OwnerAuthorizer::new("user"))
}

/// Register the demo entity types, their routes and toy authentication.
pub fn register(builder: &mut AppBuilder) -> &mut AppBuilder {
	builder
		.entity(users())
		.entity(posts())
		.collection("/users", USERS, &[])
		.item("/users/{username}", USERS, &[("username", "username")])
		.collection("/users/{username}/posts", POSTS, &[("username", "user")])
		.item("/users/{username}/posts/{id}", POSTS, &[("username", "user"), ("id", "id")])
		.toy_auth(true)
}

fn record(value: Value) -> Record {
	match value {
		Value::Object(map) => map,
		_ => Record::new(),
	}
}

/// Store the demo users (`spam`, staff member `ham`, admin `eggs`) and a few posts.
pub async fn seed(store: &dyn StoreAdapter) -> RgResult<()> {
	let users = [
		json!({"id": 1, "username": "spam", "fullname": "Spam", "email": "spam@x", "badges": 1, "is_staff": false}),
		json!({"id": 2, "username": "ham", "fullname": "Ham", "email": "ham@x", "badges": 5, "is_staff": true}),
		json!({"id": 3, "username": "eggs", "fullname": "Eggs", "email": "eggs@x", "badges": 3, "is_staff": true, "is_admin": true}),
	];
	for user in users {
		store.save(USERS, "id", &record(user)).await?;
	}

	let posts = [
		json!({"id": 1, "user": "spam", "message": "Spam, spam, spam"}),
		json!({"id": 2, "user": "spam", "message": "Lovely spam"}),
		json!({"id": 3, "user": "ham", "message": "Ham here"}),
	];
	for post in posts {
		store.save(POSTS, "id", &record(post)).await?;
	}

	info!("demo data seeded");
	Ok(())
}

// vim: ts=4
