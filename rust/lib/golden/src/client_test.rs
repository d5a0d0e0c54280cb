//! Client golden tests: the real client against a live backend over HTTP.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Json;
    use serde_json::json;

    use catalog_client::product::ITEMS_PATH;
    use catalog_client::session::{AUTHENTICATED_PATH, USER_PATH};
    use catalog_client::{
        ApiError, ClientConfig, LoginResponse, NewProduct, Price, Product, ProductPatch,
        RegisterRequest, User,
    };
    use catalog_kv::{KVStore, MemoryStore};

    use crate::server::Hits;
    use crate::support::*;

    fn widget() -> NewProduct {
        NewProduct::new("Widget", Price::from_cents(999), true)
    }

    fn offline_login(token: &str, refresh: Option<&str>) -> LoginResponse {
        LoginResponse {
            access_token: token.to_string(),
            refresh_token: refresh.map(str::to_string),
            user: User {
                id: 1,
                username: USERNAME.into(),
                email: String::new(),
                first_name: None,
                last_name: None,
            },
            expires_in: None,
        }
    }

    // =====================================================================
    // Session
    // =====================================================================

    #[tokio::test]
    async fn login_stores_session() {
        let server = start_default().await;
        let client = client(&server);

        let user = client.auth.login(USERNAME, PASSWORD).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.initials(), "AL");

        assert!(client.session.has_valid_token());
        assert!(client.session.refresh_token().is_some());
        assert_eq!(client.session.current_user().unwrap().username, "alice");
        assert_eq!(client.state.get_cloned::<bool>(AUTHENTICATED_PATH), Some(true));
        assert_eq!(
            client
                .state
                .get_cloned::<Option<User>>(USER_PATH)
                .flatten()
                .map(|u| u.username),
            Some("alice".to_string())
        );
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let server = start_default().await;
        let client = client(&server);

        let err = client.auth.login(USERNAME, "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)), "got {:?}", err);
        assert!(client.session.token().is_none());
        assert!(!client.session.is_authenticated());
        assert_eq!(Hits::get(&server.backend.hits().refresh), 0);
    }

    #[tokio::test]
    async fn expired_token_clears_session() {
        let server = start_server(seeded_backend(-30)).await;
        let client = client(&server);

        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        assert!(client.session.token().is_some());

        assert!(!client.session.has_valid_token());
        assert!(client.session.token().is_none());
        assert!(client.session.refresh_token().is_none());
        assert!(client.session.current_user().is_none());
        assert_eq!(client.state.get_cloned::<bool>(AUTHENTICATED_PATH), Some(false));
    }

    #[tokio::test]
    async fn session_survives_new_client_on_same_storage() {
        let server = start_default().await;
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());

        let first = client_for(&server.base_url, kv.clone());
        first.auth.login(USERNAME, PASSWORD).await.unwrap();

        let second = client_for(&server.base_url, kv);
        assert!(second.session.is_authenticated());
        assert_eq!(second.products.list().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_origin() {
        let server = start_default().await;
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());

        let live = client_for(&server.base_url, kv.clone());
        let other = client_for(&unreachable_url(), kv);

        live.auth.login(USERNAME, PASSWORD).await.unwrap();
        assert!(live.session.token().is_some());
        assert!(other.session.token().is_none());
        assert!(!other.session.has_valid_token());

        other.session.clear().unwrap();
        assert!(live.session.has_valid_token());
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_is_unreachable() {
        let client = client_for(&unreachable_url(), Arc::new(MemoryStore::new()));
        client
            .session
            .set_session(&offline_login("a.b.c", Some("r")))
            .unwrap();
        assert!(client.session.is_authenticated());

        client.auth.logout().await.unwrap();
        assert!(client.session.token().is_none());
        assert!(client.session.refresh_token().is_none());
        assert!(!client.session.is_authenticated());
    }

    #[tokio::test]
    async fn logout_reaches_server() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();

        client.auth.logout().await.unwrap();
        assert_eq!(Hits::get(&server.backend.hits().logout), 1);
        assert!(!client.auth.is_authenticated());
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_expires_session() {
        let server = start_default().await;
        let client = client(&server);
        client
            .session
            .set_session(&offline_login("a.b.c", None))
            .unwrap();

        let err = client.auth.refresh_token().await.unwrap_err();
        assert!(err.is_session_ending(), "got {:?}", err);
        assert!(client.session.token().is_none());
        assert_eq!(Hits::get(&server.backend.hits().refresh), 0);
    }

    #[tokio::test]
    async fn register_then_login() {
        let server = start_default().await;
        let client = client(&server);

        let req = RegisterRequest {
            first_name: "Bob".into(),
            last_name: "Builder".into(),
            email: "bob@example.com".into(),
            username: "bob".into(),
            password: "secret1".into(),
        };
        client.auth.register(&req).await.unwrap();
        assert!(client.session.token().is_none(), "register must not sign in");

        let err = client.auth.register(&req).await.unwrap_err();
        let fields = err.field_errors().expect("field errors");
        assert_eq!(fields["username"][0], "A user with that username already exists.");

        let user = client.auth.login("bob", "secret1").await.unwrap();
        assert_eq!(user.display_name(), "Bob Builder");
    }

    // =====================================================================
    // Authorizer
    // =====================================================================

    #[tokio::test]
    async fn stale_token_refreshes_exactly_once() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        let before = client.session.token().unwrap();

        server.backend.jwt().expire_access_tokens();
        let items = client.products.list().await.unwrap();

        assert_eq!(items.len(), 5);
        let hits = server.backend.hits();
        assert_eq!(Hits::get(&hits.refresh), 1);
        assert_eq!(Hits::get(&hits.products), 2, "one 401 and one retry");
        assert_ne!(client.session.token().unwrap(), before);
        assert!(client.session.is_authenticated());
    }

    #[tokio::test]
    async fn failed_refresh_ends_session() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();

        let sign_outs = Arc::new(AtomicUsize::new(0));
        let counter = sign_outs.clone();
        client.state.subscribe(AUTHENTICATED_PATH, move |_, value| {
            if value.cloned::<bool>() == Some(false) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        server.backend.jwt().expire_access_tokens();
        server.backend.jwt().revoke_refresh_tokens();
        let err = client.products.list().await.unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired(_)), "got {:?}", err);
        assert_eq!(sign_outs.load(Ordering::SeqCst), 1, "session ends once");
        let hits = server.backend.hits();
        assert_eq!(Hits::get(&hits.refresh), 1);
        assert_eq!(Hits::get(&hits.products), 1, "no retry after a failed refresh");
        assert!(client.session.token().is_none());
        assert_eq!(client.state.get_cloned::<bool>(AUTHENTICATED_PATH), Some(false));
    }

    #[tokio::test]
    async fn second_401_after_refresh_is_final() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let lists = Arc::new(AtomicUsize::new(0));
        let (r, l) = (refreshes.clone(), lists.clone());
        let app = axum::Router::new()
            .route(
                "/api/auth/refresh/",
                post(move || {
                    let r = r.clone();
                    async move {
                        r.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "access_token": "fresh" }))
                    }
                }),
            )
            .route(
                "/api/products/",
                get(move || {
                    let l = l.clone();
                    async move {
                        l.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "no" })))
                    }
                }),
            );
        let base_url = start_stub(app).await;

        let client = client_for(&base_url, Arc::new(MemoryStore::new()));
        client
            .session
            .set_session(&offline_login("stale", Some("r")))
            .unwrap();

        let err = client.products.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "no"), "got {:?}", err);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(lists.load(Ordering::SeqCst), 2, "one retry, no loop");
        assert_eq!(client.session.token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn anonymous_call_ends_without_refresh_round_trip() {
        let server = start_default().await;
        let client = client(&server);

        let err = client.products.list().await.unwrap_err();
        assert!(err.is_session_ending());
        assert_eq!(Hits::get(&server.backend.hits().refresh), 0);
    }

    #[tokio::test]
    async fn token_scheme_is_accepted() {
        let server = start_default().await;
        let config = ClientConfig::new(&server.base_url).with_scheme("Token");
        let client = catalog_client::CatalogClient::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(catalog_flux::StateStore::new()),
        )
        .unwrap();
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        assert_eq!(client.products.list().await.unwrap().len(), 5);
    }

    // =====================================================================
    // Product repository
    // =====================================================================

    #[tokio::test]
    async fn list_mirrors_server_order() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();

        let items = client.products.list().await.unwrap();
        assert_eq!(items[0].name, "Teclado Mecânico Razer");
        assert_eq!(items[4].price.to_string(), "899.99");
        assert_eq!(client.products.snapshot(), items);
        assert_eq!(client.state.get_cloned::<Vec<Product>>(ITEMS_PATH), Some(items));
    }

    #[tokio::test]
    async fn connect_loads_mirror_when_signed_in() {
        let server = start_default().await;
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        client_for(&server.base_url, kv.clone())
            .auth
            .login(USERNAME, PASSWORD)
            .await
            .unwrap();

        let client = catalog_client::CatalogClient::connect(
            ClientConfig::new(&server.base_url),
            kv,
            Arc::new(catalog_flux::StateStore::new()),
        )
        .await
        .unwrap();
        assert_eq!(client.products.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn create_widget_gets_server_id() {
        let server = start_default().await;
        server.backend.set_next_product_id(42);
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        let before = client.products.list().await.unwrap().len();

        let created = client.products.create(&widget()).await.unwrap();
        assert_eq!(created.id, 42);
        assert_eq!(created.price.cents(), 999);
        assert_eq!(client.products.snapshot().len(), before + 1);

        let items = client.products.list().await.unwrap();
        assert_eq!(items.len(), before + 1);
        assert_eq!(items.iter().filter(|p| p.id == 42).count(), 1);
        assert_eq!(client.products.cached(42).unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn update_and_replace() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        client.products.list().await.unwrap();

        let patch = ProductPatch {
            available: Some(true),
            ..Default::default()
        };
        let updated = client.products.update(3, &patch).await.unwrap();
        assert!(updated.available);
        assert_eq!(updated.name, "Fone Bluetooth JBL");
        assert!(client.products.cached(3).unwrap().available);

        let replaced = client
            .products
            .replace(3, &NewProduct::new("Fone JBL Tune", Price::from_cents(12000), false))
            .await
            .unwrap();
        assert_eq!(replaced.name, "Fone JBL Tune");
        assert_eq!(client.products.cached(3).unwrap().price.to_string(), "120.00");
    }

    #[tokio::test]
    async fn server_validation_leaves_mirror_alone() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        let before = client.products.list().await.unwrap();

        let err = client
            .products
            .create(&NewProduct::new("   ", Price::ZERO, true))
            .await
            .unwrap_err();
        let fields = err.field_errors().expect("field errors");
        assert!(fields.contains_key("name"));
        assert_eq!(fields["price"][0], "Price must be greater than zero.");
        assert_eq!(err.to_string(), "invalid data");
        assert_eq!(client.products.snapshot(), before);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        client.products.list().await.unwrap();

        client.products.delete(2).await.unwrap();
        let ids: Vec<i64> = client.products.snapshot().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 1]);

        let err = client.products.get_by_id(2).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        let before = client.products.list().await.unwrap();

        let err = client.products.delete(999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got {:?}", err);
        assert_eq!(err.to_string(), "not found");
        assert_eq!(client.products.snapshot(), before);
    }

    #[tokio::test]
    async fn available_list_leaves_mirror_alone() {
        let server = start_default().await;
        let client = client(&server);
        client.auth.login(USERNAME, PASSWORD).await.unwrap();
        client.products.list().await.unwrap();

        let available = client.products.list_available().await.unwrap();
        assert_eq!(available.len(), 4);
        assert!(available.iter().all(|p| p.available));
        assert_eq!(client.products.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let client = client_for(&unreachable_url(), Arc::new(MemoryStore::new()));
        let err = client.auth.login(USERNAME, PASSWORD).await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkUnreachable(_)), "got {:?}", err);
        assert_eq!(err.to_string(), "cannot connect");
    }
}
