//! Built-in listing table for the simulated NSE market.
//!
//! Anchor prices are the "today" prices each symbol's generated history
//! ends at. The set is fixed per session; sessions own their copy.

/// One listed instrument before any market data is generated for it.
#[derive(Debug, Clone)]
pub struct Listing {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub anchor_price: f64,
}

pub const LISTINGS: &[Listing] = &[
    Listing { symbol: "RELIANCE", name: "Reliance Industries Ltd", sector: "Energy", anchor_price: 2950.75 },
    Listing { symbol: "TCS", name: "Tata Consultancy Services", sector: "Information Technology", anchor_price: 3850.50 },
    Listing { symbol: "HDFCBANK", name: "HDFC Bank Ltd", sector: "Financials", anchor_price: 1680.30 },
    Listing { symbol: "INFY", name: "Infosys Ltd", sector: "Information Technology", anchor_price: 1630.80 },
    Listing { symbol: "ICICIBANK", name: "ICICI Bank Ltd", sector: "Financials", anchor_price: 1120.10 },
    Listing { symbol: "HINDUNILVR", name: "Hindustan Unilever Ltd", sector: "Consumer Staples", anchor_price: 2450.90 },
    Listing { symbol: "SBIN", name: "State Bank of India", sector: "Financials", anchor_price: 830.60 },
    Listing { symbol: "BHARTIARTL", name: "Bharti Airtel Ltd", sector: "Communication Services", anchor_price: 1380.25 },
    Listing { symbol: "LT", name: "Larsen & Toubro Ltd", sector: "Industrials", anchor_price: 3590.45 },
    Listing { symbol: "KOTAKBANK", name: "Kotak Mahindra Bank Ltd", sector: "Financials", anchor_price: 1750.00 },
    Listing { symbol: "ITC", name: "ITC Ltd", sector: "Consumer Staples", anchor_price: 430.70 },
    Listing { symbol: "BAJFINANCE", name: "Bajaj Finance Ltd", sector: "Financials", anchor_price: 7200.15 },
    Listing { symbol: "MARUTI", name: "Maruti Suzuki India Ltd", sector: "Automobile", anchor_price: 12_500.00 },
    Listing { symbol: "TATAMOTORS", name: "Tata Motors Ltd", sector: "Automobile", anchor_price: 980.50 },
    Listing { symbol: "SUNPHARMA", name: "Sun Pharmaceutical Industries", sector: "Healthcare", anchor_price: 1590.80 },
    Listing { symbol: "DRREDDY", name: "Dr. Reddy's Laboratories Ltd", sector: "Healthcare", anchor_price: 6200.20 },
    Listing { symbol: "WIPRO", name: "Wipro Ltd", sector: "Information Technology", anchor_price: 480.25 },
    Listing { symbol: "HCLTECH", name: "HCL Technologies Ltd", sector: "Information Technology", anchor_price: 1440.70 },
    Listing { symbol: "NESTLEIND", name: "Nestle India Ltd", sector: "Consumer Staples", anchor_price: 2550.00 },
    Listing { symbol: "TATASTEEL", name: "Tata Steel Ltd", sector: "Materials", anchor_price: 165.80 },
    Listing { symbol: "JSWSTEEL", name: "JSW Steel Ltd", sector: "Materials", anchor_price: 910.40 },
    Listing { symbol: "NTPC", name: "NTPC Ltd", sector: "Utilities", anchor_price: 360.55 },
    Listing { symbol: "ADANIENT", name: "Adani Enterprises Ltd", sector: "Conglomerate", anchor_price: 3250.00 },
    Listing { symbol: "ADANIPORTS", name: "Adani Ports & SEZ Ltd", sector: "Industrials", anchor_price: 1350.10 },
    Listing { symbol: "ULTRACEMCO", name: "UltraTech Cement Ltd", sector: "Materials", anchor_price: 10_800.00 },
    Listing { symbol: "ASIANPAINT", name: "Asian Paints Ltd", sector: "Materials", anchor_price: 2890.60 },
    Listing { symbol: "AXISBANK", name: "Axis Bank Ltd", sector: "Financials", anchor_price: 1225.00 },
    Listing { symbol: "BAJAJFINSV", name: "Bajaj Finserv Ltd", sector: "Financials", anchor_price: 1580.90 },
    Listing { symbol: "M_M", name: "Mahindra & Mahindra Ltd", sector: "Automobile", anchor_price: 2850.40 },
    Listing { symbol: "TITAN", name: "Titan Company Ltd", sector: "Consumer Discretionary", anchor_price: 3500.75 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_unique() {
        let mut seen = std::collections::HashSet::new();
        for l in LISTINGS {
            assert!(seen.insert(l.symbol), "duplicate symbol {}", l.symbol);
        }
        assert_eq!(LISTINGS.len(), 30);
    }

    #[test]
    fn test_anchor_prices_positive() {
        for l in LISTINGS {
            assert!(l.anchor_price > 0.0, "{} has non-positive anchor", l.symbol);
        }
    }
}
