//! View-layer golden tests: intents in, view state out, against a live
//! backend.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catalog_bff::form::{ProductForm, RegisterForm};
    use catalog_bff::request::*;
    use catalog_bff::state::*;
    use catalog_bff::{build, CatalogContext};
    use catalog_flux::Flux;

    use crate::server::Hits;
    use crate::support::*;

    async fn app(server: &TestServer) -> Flux {
        let ctx = Arc::new(CatalogContext::new(client(server)));
        let flux = build(ctx);
        flux.emit(InitializeReq::PATH, InitializeReq::default()).await;
        flux
    }

    async fn signed_in(server: &TestServer) -> Flux {
        let flux = app(server).await;
        flux.emit(LoginReq::PATH, LoginReq::new(USERNAME, PASSWORD)).await;
        flux
    }

    fn route(flux: &Flux) -> String {
        flux.get_cloned::<AppRoute>(AppRoute::PATH).unwrap().0
    }

    fn latest(flux: &Flux) -> Notification {
        flux.get_cloned::<Notifications>(Notifications::PATH)
            .unwrap()
            .latest()
            .cloned()
            .expect("a notification")
    }

    fn list(flux: &Flux) -> ProductListView {
        flux.get_cloned(ProductListView::PATH).unwrap()
    }

    fn product_form(name: &str, price: &str) -> ProductForm {
        ProductForm {
            id: None,
            name: name.into(),
            price: price.into(),
            available: true,
        }
    }

    // =====================================================================
    // Navigation and login
    // =====================================================================

    #[tokio::test]
    async fn anonymous_product_route_lands_on_login() {
        let server = start_default().await;
        let ctx = Arc::new(CatalogContext::new(client(&server)));
        let flux = build(ctx);

        flux.emit(
            InitializeReq::PATH,
            InitializeReq {
                route: Some("/products/new".into()),
            },
        )
        .await;

        assert_eq!(route(&flux), "/login?returnUrl=/products/new");
        let login: LoginFormState = flux.get_cloned(LoginFormState::PATH).unwrap();
        assert_eq!(login.return_url.as_deref(), Some("/products/new"));
        assert!(!flux.get_cloned::<AuthState>(AuthState::PATH).unwrap().is_authenticated());
        assert_eq!(server.backend.hits().total(), 0);
    }

    #[tokio::test]
    async fn login_goes_to_return_url() {
        let server = start_default().await;
        let ctx = Arc::new(CatalogContext::new(client(&server)));
        let flux = build(ctx);
        flux.emit(
            InitializeReq::PATH,
            InitializeReq {
                route: Some("/products/new".into()),
            },
        )
        .await;

        flux.emit(LoginReq::PATH, LoginReq::new(USERNAME, PASSWORD)).await;

        assert_eq!(route(&flux), "/products/new");
        let form: ProductFormState = flux.get_cloned(ProductFormState::PATH).unwrap();
        assert!(form.visible);
        assert_eq!(form.title, "New product");
    }

    #[tokio::test]
    async fn login_fills_header_and_list() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        let auth: AuthState = flux.get_cloned(AuthState::PATH).unwrap();
        assert!(auth.is_authenticated());
        let user = auth.user.unwrap();
        assert_eq!(user.initials, "AL");
        assert_eq!(user.display_name, "Alice Liddell");

        assert_eq!(route(&flux), "/products");
        assert_eq!(list(&flux).items.len(), 5);
        assert_eq!(latest(&flux).summary, "Signed in");
    }

    #[tokio::test]
    async fn invalid_login_form_never_hits_network() {
        let server = start_default().await;
        let flux = app(&server).await;

        flux.emit(LoginReq::PATH, LoginReq::new("  ", "")).await;

        let form: LoginFormState = flux.get_cloned(LoginFormState::PATH).unwrap();
        assert_eq!(form.errors.get("username"), Some("Username is required"));
        assert_eq!(form.errors.get("password"), Some("Password is required"));
        assert_eq!(Hits::get(&server.backend.hits().login), 0);
    }

    #[tokio::test]
    async fn wrong_password_shows_message() {
        let server = start_default().await;
        let flux = app(&server).await;

        flux.emit(LoginReq::PATH, LoginReq::new(USERNAME, "wrong")).await;

        let auth: AuthState = flux.get_cloned(AuthState::PATH).unwrap();
        assert_eq!(auth.error.as_deref(), Some("Wrong username or password."));
        assert!(!auth.busy);
        let toast = latest(&flux);
        assert_eq!(toast.summary, "Login failed");
        assert_eq!(toast.severity, Severity::Error);
        assert!(route(&flux).starts_with("/login"));
    }

    #[tokio::test]
    async fn signed_in_user_skips_login_screen() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(NavigateReq::PATH, NavigateReq::to("/login")).await;
        assert_eq!(route(&flux), "/products");
        flux.emit(NavigateReq::PATH, NavigateReq::to("/register")).await;
        assert_eq!(route(&flux), "/products");
    }

    #[tokio::test]
    async fn logout_returns_to_login() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(LogoutReq::PATH, LogoutReq).await;

        assert_eq!(route(&flux), "/login");
        assert!(!flux.get_cloned::<AuthState>(AuthState::PATH).unwrap().is_authenticated());
        assert!(list(&flux).items.is_empty());
        assert_eq!(latest(&flux).summary, "Signed out");
        assert_eq!(Hits::get(&server.backend.hits().logout), 1);
    }

    #[tokio::test]
    async fn ended_session_routes_to_login() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        server.backend.jwt().expire_access_tokens();
        server.backend.jwt().revoke_refresh_tokens();
        flux.emit(LoadProductsReq::PATH, LoadProductsReq).await;

        assert!(route(&flux).starts_with("/login"), "route: {}", route(&flux));
        assert!(!flux.get_cloned::<AuthState>(AuthState::PATH).unwrap().is_authenticated());
        assert_eq!(latest(&flux).summary, "Session expired");
    }

    #[tokio::test]
    async fn dismiss_removes_toast() {
        let server = start_default().await;
        let flux = signed_in(&server).await;
        let id = latest(&flux).id;

        flux.emit(DismissReq::PATH, DismissReq { id }).await;
        let toasts: Notifications = flux.get_cloned(Notifications::PATH).unwrap();
        assert!(toasts.0.iter().all(|n| n.id != id));
    }

    // =====================================================================
    // Register
    // =====================================================================

    fn register_form(username: &str) -> RegisterForm {
        RegisterForm {
            first_name: "Carol".into(),
            last_name: "Danvers".into(),
            email: "carol@example.com".into(),
            username: username.into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn register_mismatch_never_hits_network() {
        let server = start_default().await;
        let flux = app(&server).await;

        let mut form = register_form("carol");
        form.confirm_password = "other".into();
        flux.emit(RegisterReq::PATH, RegisterReq { form }).await;

        let state: RegisterFormState = flux.get_cloned(RegisterFormState::PATH).unwrap();
        assert_eq!(state.errors.get("confirm_password"), Some("Passwords do not match"));
        assert_eq!(Hits::get(&server.backend.hits().register), 0);
    }

    #[tokio::test]
    async fn register_goes_to_login() {
        let server = start_default().await;
        let flux = app(&server).await;

        flux.emit(RegisterReq::PATH, RegisterReq { form: register_form("carol") }).await;

        assert_eq!(route(&flux), "/login");
        assert_eq!(latest(&flux).summary, "Account created");
    }

    #[tokio::test]
    async fn duplicate_username_lists_field() {
        let server = start_default().await;
        let flux = app(&server).await;

        flux.emit(RegisterReq::PATH, RegisterReq { form: register_form(USERNAME) }).await;

        let toast = latest(&flux);
        assert_eq!(toast.summary, "Registration failed");
        assert_eq!(toast.detail, "Username: A user with that username already exists.");
        let state: RegisterFormState = flux.get_cloned(RegisterFormState::PATH).unwrap();
        assert!(state.errors.get("username").is_some());
        assert!(!state.busy);
    }

    // =====================================================================
    // Products
    // =====================================================================

    #[tokio::test]
    async fn invalid_product_form_never_hits_network() {
        let server = start_default().await;
        let flux = signed_in(&server).await;
        let before = Hits::get(&server.backend.hits().products);

        flux.emit(NewProductReq::PATH, NewProductReq).await;
        flux.emit(
            SaveProductReq::PATH,
            SaveProductReq {
                form: product_form(" ", "1.999"),
            },
        )
        .await;

        let form: ProductFormState = flux.get_cloned(ProductFormState::PATH).unwrap();
        assert!(form.visible);
        assert_eq!(form.errors.get("name"), Some("Name is required"));
        assert_eq!(form.errors.get("price"), Some("Price allows at most two decimals"));
        assert_eq!(Hits::get(&server.backend.hits().products), before);
    }

    #[tokio::test]
    async fn save_new_product_shows_in_list() {
        let server = start_default().await;
        server.backend.set_next_product_id(42);
        let flux = signed_in(&server).await;

        flux.emit(
            SaveProductReq::PATH,
            SaveProductReq {
                form: product_form("Widget", "9.99"),
            },
        )
        .await;

        let view = list(&flux);
        assert_eq!(view.items.len(), 6);
        assert_eq!(view.items.iter().filter(|p| p.id == 42).count(), 1);
        assert!(!flux.get_cloned::<ProductFormState>(ProductFormState::PATH).unwrap().visible);
        let toast = latest(&flux);
        assert_eq!(toast.summary, "Product created");
        assert_eq!(toast.detail, "Widget");
        assert_eq!(route(&flux), "/products");
    }

    #[tokio::test]
    async fn server_rejection_keeps_dialog_open() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(
            SaveProductReq::PATH,
            SaveProductReq {
                form: product_form("Freebie", "0"),
            },
        )
        .await;

        let form: ProductFormState = flux.get_cloned(ProductFormState::PATH).unwrap();
        assert!(form.visible);
        assert!(!form.busy);
        assert_eq!(form.errors.get("price"), Some("Price must be greater than zero."));
        assert_eq!(list(&flux).items.len(), 5);
    }

    #[tokio::test]
    async fn edit_prefills_and_updates() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(EditProductReq::PATH, EditProductReq { id: 4 }).await;
        assert_eq!(route(&flux), "/products/edit/4");
        let dialog: ProductFormState = flux.get_cloned(ProductFormState::PATH).unwrap();
        assert_eq!(dialog.title, "Edit product");
        assert_eq!(dialog.form.name, "Mouse Logitech MX");
        assert_eq!(dialog.form.price, "89.90");

        let mut form = dialog.form.clone();
        form.price = "79.90".into();
        flux.emit(SaveProductReq::PATH, SaveProductReq { form }).await;

        assert_eq!(latest(&flux).summary, "Product updated");
        let row = list(&flux).items.into_iter().find(|p| p.id == 4).unwrap();
        assert_eq!(row.price.to_string(), "79.90");
    }

    #[tokio::test]
    async fn missing_product_falls_back_to_list() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(ViewProductReq::PATH, ViewProductReq { id: 999 }).await;

        assert_eq!(route(&flux), "/products");
        assert_eq!(latest(&flux).summary, "Product not found");
        assert!(!flux.get_cloned::<ProductDetailView>(ProductDetailView::PATH).unwrap().visible);
    }

    #[tokio::test]
    async fn detail_opens_and_closes() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(ViewProductReq::PATH, ViewProductReq { id: 1 }).await;
        let detail: ProductDetailView = flux.get_cloned(ProductDetailView::PATH).unwrap();
        assert!(detail.visible);
        assert_eq!(detail.product.unwrap().name, "Smartphone Samsung Galaxy");

        flux.emit(CloseDetailReq::PATH, CloseDetailReq).await;
        assert!(!flux.get_cloned::<ProductDetailView>(ProductDetailView::PATH).unwrap().visible);
        assert_eq!(route(&flux), "/products");
    }

    #[tokio::test]
    async fn delete_after_confirmation() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(AskDeleteReq::PATH, AskDeleteReq { id: 3 }).await;
        let dialog: DeleteDialog = flux.get_cloned(DeleteDialog::PATH).unwrap();
        assert!(dialog.visible);
        assert_eq!(dialog.product.as_ref().unwrap().name, "Fone Bluetooth JBL");

        flux.emit(ConfirmDeleteReq::PATH, ConfirmDeleteReq).await;

        assert!(!flux.get_cloned::<DeleteDialog>(DeleteDialog::PATH).unwrap().visible);
        let ids: Vec<i64> = list(&flux).items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 4, 2, 1]);
        assert_eq!(latest(&flux).summary, "Product removed");
    }

    #[tokio::test]
    async fn cancel_delete_keeps_product() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(AskDeleteReq::PATH, AskDeleteReq { id: 3 }).await;
        flux.emit(CancelDeleteReq::PATH, CancelDeleteReq).await;

        assert!(!flux.get_cloned::<DeleteDialog>(DeleteDialog::PATH).unwrap().visible);
        assert_eq!(list(&flux).items.len(), 5);
    }

    #[tokio::test]
    async fn available_filter_and_back() {
        let server = start_default().await;
        let flux = signed_in(&server).await;

        flux.emit(LoadAvailableReq::PATH, LoadAvailableReq).await;
        let view = list(&flux);
        assert_eq!(view.filter, ListFilter::AvailableOnly);
        assert_eq!(view.items.len(), 4);

        flux.emit(LoadProductsReq::PATH, LoadProductsReq).await;
        let view = list(&flux);
        assert_eq!(view.filter, ListFilter::All);
        assert_eq!(view.items.len(), 5);
        assert!(!view.loading);
    }
}
