//! Closed vocabularies for metrics, time periods and granularities
//!
//! Each vocabulary carries three spellings per value: the lower-case token a
//! user types, the id the chart backend expects, and a display name used in
//! chart titles.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Generate a closed vocabulary enum with token, backend id and display name
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($token:literal, $backend:literal, $display:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Every value in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Token as typed by users
            #[inline]
            #[must_use]
            pub const fn token(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            /// Id understood by the chart backend
            #[inline]
            #[must_use]
            pub const fn backend_id(self) -> &'static str {
                match self {
                    $(Self::$variant => $backend,)+
                }
            }

            /// Human-readable name used in titles
            #[inline]
            #[must_use]
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $display,)+
                }
            }

            /// Exact lookup by canonical token (callers lower-case first)
            #[must_use]
            pub fn from_token(token: &str) -> Option<Self> {
                match token {
                    $($token => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canonical tokens joined for error messages
            #[must_use]
            pub fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|value| value.token())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        }
    };
}

vocabulary! {
    /// Chartable metric
    Metric {
        /// Token price
        Price => ("price", "PRICE", "Price"),
        /// Trading volume
        Volume => ("volume", "VOLUME", "Volume"),
        /// Total value locked
        Tvl => ("tvl", "TVL", "TVL"),
        /// Fees paid
        Fees => ("fees", "FEES", "Fees"),
        /// Protocol revenue
        Revenue => ("revenue", "REVENUE", "Revenue"),
        /// Market capitalisation
        MarketCap => ("mc", "MC", "Market Cap"),
        /// Transaction count
        Transactions => ("txns", "TXNS", "Transactions"),
        /// Daily active addresses
        DailyActiveAddresses => ("daa", "DAA", "Daily Active Addresses"),
        /// Daily active users
        DailyActiveUsers => ("dau", "DAU", "Daily Active Users"),
        /// Fully diluted market capitalisation
        FullyDilutedMarketCap => ("fdmc", "FDMC", "Fully Diluted Market Cap"),
    }
}

vocabulary! {
    /// Chart time window
    TimePeriod {
        /// Last seven days
        OneWeek => ("1w", "WEEKLY", "1 Week"),
        /// Current month so far
        MonthToDate => ("mtd", "MONTH_TO_DATE", "Month to Date"),
        /// Last month
        OneMonth => ("1m", "MONTHLY", "1 Month"),
        /// Last three months
        ThreeMonths => ("3m", "THREE_MONTHS", "3 Months"),
        /// Last six months
        SixMonths => ("6m", "SIX_MONTHS", "6 Months"),
        /// Current year so far
        YearToDate => ("ytd", "YEAR_TO_DATE", "Year to Date"),
        /// Last year
        OneYear => ("1y", "ONE_YEAR", "1 Year"),
        /// Full history
        All => ("all", "MAX", "All Time"),
    }
}

vocabulary! {
    /// Spacing between data points
    Granularity {
        /// One point per day
        Daily => ("1d", "DAY", "Daily"),
        /// One point per week
        Weekly => ("1w", "WEEK", "Weekly"),
        /// One point per month
        Monthly => ("1m", "MONTH", "Monthly"),
    }
}

/// Alternate spellings accepted for metrics
const METRIC_ALIASES: &[(&str, Metric)] = &[
    ("fee", Metric::Fees),
    ("vol", Metric::Volume),
    ("marketcap", Metric::MarketCap),
    ("mcap", Metric::MarketCap),
    ("rev", Metric::Revenue),
    ("revs", Metric::Revenue),
    ("transactions", Metric::Transactions),
];

impl Metric {
    /// Lookup by canonical token or alias
    #[must_use]
    pub fn lookup(token: &str) -> Option<Self> {
        Self::from_token(token).or_else(|| {
            METRIC_ALIASES
                .iter()
                .find(|(alias, _)| *alias == token)
                .map(|&(_, metric)| metric)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_token(metric.token()), Some(*metric));
        }
        for period in TimePeriod::ALL {
            assert_eq!(TimePeriod::from_token(period.token()), Some(*period));
        }
        for granularity in Granularity::ALL {
            assert_eq!(
                Granularity::from_token(granularity.token()),
                Some(*granularity)
            );
        }
    }

    #[test]
    fn aliases_resolve_to_canonical() {
        assert_eq!(Metric::lookup("mcap"), Some(Metric::MarketCap));
        assert_eq!(Metric::lookup("revs"), Some(Metric::Revenue));
        assert_eq!(Metric::lookup("vol"), Some(Metric::Volume));
        assert_eq!(Metric::lookup("tx"), None);
        assert_eq!(Metric::from_token("fee"), None);
    }

    #[test]
    fn allowed_lists_canonical_tokens_only() {
        assert_eq!(
            Metric::allowed(),
            "price, volume, tvl, fees, revenue, mc, txns, daa, dau, fdmc"
        );
        assert_eq!(TimePeriod::allowed(), "1w, mtd, 1m, 3m, 6m, ytd, 1y, all");
        assert_eq!(Granularity::allowed(), "1d, 1w, 1m");
    }

    #[test]
    fn backend_and_display_names() {
        assert_eq!(TimePeriod::All.backend_id(), "MAX");
        assert_eq!(TimePeriod::OneWeek.display_name(), "1 Week");
        assert_eq!(Granularity::Monthly.backend_id(), "MONTH");
        assert_eq!(Metric::MarketCap.display_name(), "Market Cap");
        assert_eq!(Metric::Tvl.to_string(), "tvl");
    }
}
