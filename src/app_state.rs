use std::sync::Arc;

use crate::{
    auth::{AuthService, IdentityProvider, LocalIdentityProvider},
    config::Config,
    contact::ContactStore,
    profile::ProfileService,
    provider::MovieCatalog,
    reviews::ReviewStore,
    store::{seed, DocumentStore},
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MovieCatalog>,
    pub reviews: Arc<ReviewStore>,
    pub profiles: Arc<ProfileService>,
    pub auth: Arc<AuthService>,
    pub contact: Arc<ContactStore>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize the document store
        let store = Arc::new(DocumentStore::new(&config.database.url).await?);
        store.init().await?;
        seed::seed_sample_movies(store.clone()).await?;

        let catalog = Arc::new(MovieCatalog::new(&config.provider, &config.cache));
        let reviews = Arc::new(ReviewStore::new(store.clone()));
        let profiles = Arc::new(ProfileService::new(store.clone(), reviews.clone()));

        let identity: Arc<dyn IdentityProvider> =
            Arc::new(LocalIdentityProvider::new(store.clone()));
        let auth = Arc::new(AuthService::new(identity, store.clone()));
        let contact = Arc::new(ContactStore::new(store));

        Ok(Self {
            catalog,
            reviews,
            profiles,
            auth,
            contact,
            config,
        })
    }
}
