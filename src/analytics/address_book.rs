use std::collections::HashMap;

/// Static address-to-venue tables consulted by the classifier.
///
/// Immutable after construction and injected into the classifier, so tests
/// can substitute fixture tables. All lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    dex_routers: HashMap<String, String>,
    cex_hot_wallets: HashMap<String, String>,
    perp_routers: HashMap<String, String>,
    lending_routers: HashMap<String, String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dex_router(mut self, address: &str, venue: &str) -> Self {
        self.dex_routers.insert(address.to_lowercase(), venue.into());
        self
    }

    pub fn with_cex_hot_wallet(mut self, address: &str, venue: &str) -> Self {
        self.cex_hot_wallets.insert(address.to_lowercase(), venue.into());
        self
    }

    pub fn with_perp_router(mut self, address: &str, venue: &str) -> Self {
        self.perp_routers.insert(address.to_lowercase(), venue.into());
        self
    }

    pub fn with_lending_router(mut self, address: &str, venue: &str) -> Self {
        self.lending_routers.insert(address.to_lowercase(), venue.into());
        self
    }

    pub fn dex_venue(&self, address: &str) -> Option<&str> {
        self.dex_routers.get(&address.to_lowercase()).map(String::as_str)
    }

    pub fn cex_venue(&self, address: &str) -> Option<&str> {
        self.cex_hot_wallets.get(&address.to_lowercase()).map(String::as_str)
    }

    pub fn perp_venue(&self, address: &str) -> Option<&str> {
        self.perp_routers.get(&address.to_lowercase()).map(String::as_str)
    }

    pub fn lending_venue(&self, address: &str) -> Option<&str> {
        self.lending_routers.get(&address.to_lowercase()).map(String::as_str)
    }

    /// Mainnet routers and operator-curated exchange hot wallets.
    pub fn mainnet_defaults() -> Self {
        Self::new()
            // DEX routers
            .with_dex_router("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D", "uniswap")
            .with_dex_router("0xE592427A0AEce92De3Edee1F18E0157C05861564", "uniswap")
            .with_dex_router("0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F", "sushiswap")
            .with_dex_router("0x10ED43C718714eb63d5aA57B78B54704E256024E", "pancakeswap")
            .with_dex_router("0x1111111254EEB25477B68fb85Ed929f73A960582", "1inch")
            .with_dex_router("0xDEF171Fe48CF0115B1d80b88dc8eAB59176FEe57", "paraswap")
            // Perpetual-exchange routers
            .with_perp_router("0x489ee077994B6658eAfA855C308275EAd8097C4A", "gmx")
            .with_perp_router("0x65f7BA4Ec257AF7c55fd5854E5f6b345C2C6f3Fc", "dydx")
            .with_perp_router("0x82ac2CE43e33683c58BE4cDc40975E73aA50f459", "perp_protocol")
            .with_perp_router("0x3e0199792Ce69DC29A0a36146bFa68bd7C8D6633", "mux")
            // Lending-protocol routers
            .with_lending_router("0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9", "aave")
            .with_lending_router("0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B", "compound")
            .with_lending_router("0x9759A6Ac90977b93B58547b4A71c78317f391A28", "maker")
            // CEX hot wallets
            .with_cex_hot_wallet("0x3f5CE5FBFe3E9af3971dD833D26bA9b5C936f0bE", "binance")
            .with_cex_hot_wallet("0xD551234Ae421e3BCBA99A0Da6d736074f22192FF", "binance")
            .with_cex_hot_wallet("0x503828976D22510aad0201ac7EC88293211D23Da", "coinbase")
            .with_cex_hot_wallet("0xddfAbCdc4D8FfC6d5beaf154f18B778f892A0740", "coinbase")
            .with_cex_hot_wallet("0x267be1C1D684F78cb4F6a176C4911b741E4Ffdc0", "kraken")
            .with_cex_hot_wallet("0x53d284357ec70cE289D6D64134DfAc8e511c8a3D", "kraken")
            .with_cex_hot_wallet("0x5a52E96BAcdaBb82fd05763E25335261B270Efcb", "bybit")
            .with_cex_hot_wallet("0x8b99F3660622e21f2910ECCA7fBE51d654a1517d", "bybit")
            .with_cex_hot_wallet("0x236F9F97e0E62388479bf9E5BA4889e46B0273C3", "okx")
            .with_cex_hot_wallet("0x2910543Af39abA0Cd09dBb2D50200b3E800A63D2", "okx")
            .with_cex_hot_wallet("0xAB5C66752a9e8167967685F1450532fB96138642", "huobi")
            .with_cex_hot_wallet("0x5C985E89DDe482eFE97ea9f1950aD149Eb522e99", "huobi")
            .with_cex_hot_wallet("0xd89350284c7732163765b23338f2ff27449e0bf5", "kucoin")
            .with_cex_hot_wallet("0x88bd4d3e2997371bceefe8d9386c6b5b4de60346", "kucoin")
            .with_cex_hot_wallet("0x7793cd85c11a924478d358d49b05b37e91b5810f", "gate")
            .with_cex_hot_wallet("0x0d0707963952f2fba59dd06f2b425ace40b492fe", "gate")
            .with_cex_hot_wallet("0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc", "bitfinex")
            .with_cex_hot_wallet("0x742d35Cc6634C0532925a3b8D6C8cf4b8b8a35C8", "bitfinex")
            .with_cex_hot_wallet("0x0211F3ceDbEf3143223D3ACF0e589747933e8527", "mexc")
            .with_cex_hot_wallet("0x3cc936b795A188F0e246cBB2D74C5Bd190aeCF18", "mexc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let book = AddressBook::new().with_dex_router("0xAbCd", "uniswap");
        assert_eq!(book.dex_venue("0xABCD"), Some("uniswap"));
        assert_eq!(book.dex_venue("0xabcd"), Some("uniswap"));
        assert_eq!(book.dex_venue("0xother"), None);
    }

    #[test]
    fn test_mainnet_defaults_cover_all_tables() {
        let book = AddressBook::mainnet_defaults();
        assert_eq!(
            book.dex_venue("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
            Some("uniswap")
        );
        assert_eq!(
            book.perp_venue("0x489ee077994B6658eAfA855C308275EAd8097C4A"),
            Some("gmx")
        );
        assert_eq!(
            book.lending_venue("0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
            Some("aave")
        );
        assert_eq!(
            book.cex_venue("0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be"),
            Some("binance")
        );
    }
}
