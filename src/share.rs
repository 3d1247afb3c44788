//! Price formatting and share links for listings.

use url::Url;

use crate::models::Listing;

/// Format a price in rupees with Indian digit grouping, e.g. `₹1,25,000`.
///
/// This is the only place prices are turned into display text.
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let sign = if price < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}₹{digits}");
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{sign}₹{},{last_three}", groups.join(","))
}

/// Public page of a listing under `site`
pub fn listing_url(site: &Url, listing_id: &str) -> Url {
    let mut url = site.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("listings").push(listing_id);
    }
    url
}

/// Short text used by every share target
pub fn share_message(listing: &Listing) -> String {
    format!(
        "Check out this {} {} - {}\nPrice: {}\n",
        listing.brand,
        listing.model,
        listing.title,
        format_price(listing.price)
    )
}

/// Share targets for one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub page: Url,
    pub whatsapp: Url,
    pub facebook: Url,
    pub twitter: Url,
    pub telegram: Url,
}

const HASHTAGS: &str = "BikeBazaar,SecondHandBike";

impl ShareLinks {
    pub fn for_listing(site: &Url, listing: &Listing) -> Result<Self, url::ParseError> {
        let page = listing_url(site, &listing.id);
        let message = share_message(listing);

        let whatsapp = Url::parse_with_params(
            "https://wa.me/",
            &[("text", format!("{message}{page}"))],
        )?;
        let facebook = Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", page.as_str())],
        )?;
        let twitter = Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[
                ("text", message.as_str()),
                ("url", page.as_str()),
                ("hashtags", HASHTAGS),
            ],
        )?;
        let telegram = Url::parse_with_params(
            "https://t.me/share/url",
            &[("url", page.as_str()), ("text", message.as_str())],
        )?;

        Ok(Self {
            page,
            whatsapp,
            facebook,
            twitter,
            telegram,
        })
    }
}
