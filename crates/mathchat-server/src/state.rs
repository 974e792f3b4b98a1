use mathchat::providers::configs::ProviderConfig;
use mathchat::search::arxiv::ArxivConfig;
use mathchat::search::exa::ExaConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider_config: ProviderConfig,
    pub exa_config: Option<ExaConfig>,
    pub arxiv_config: ArxivConfig,
}
