use crate::error::ListingError;
use crate::models::CatalogSnapshot;
use catalog_common::models::{assets_for, fields};
use catalog_common::text::strip_markup;
use catalog_common::{Hotel, HotelAsset, Locale, Visa};
use serde::Serialize;

/// 酒店设施，文字去掉标记
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AssetCard {
    pub id: u64,
    pub icon: Option<String>,
    pub text: String,
}

impl AssetCard {
    pub fn from_asset(asset: &HotelAsset, locale: Locale) -> Self {
        Self {
            id: asset.id,
            icon: asset.icon.as_ref().map(|icon| icon.to_lowercase()),
            text: strip_markup(asset.fields.resolve_or_empty(fields::TEXT, locale)),
        }
    }
}

/// 酒店卡片
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HotelCard {
    pub id: u64,
    pub title: String,
    pub plain_title: String,
    /// 富文本正文，原样交给页面
    pub text: String,
    pub rating: f64,
    pub stars: u8,
    pub assets: Vec<AssetCard>,
}

impl HotelCard {
    /// `assets` 可以是全部设施，只取属于这家酒店的
    pub fn from_hotel(hotel: &Hotel, assets: &[HotelAsset], locale: Locale) -> Self {
        let title = hotel.fields.resolve_or_empty(fields::TITLE, locale).to_string();
        Self {
            id: hotel.id,
            plain_title: strip_markup(&title),
            title,
            text: hotel.fields.resolve_or_empty(fields::TEXT, locale).to_string(),
            rating: hotel.rating,
            stars: hotel.stars(),
            assets: assets_for(hotel.id, assets)
                .into_iter()
                .map(|asset| AssetCard::from_asset(asset, locale))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VisaCard {
    pub id: u64,
    pub title: String,
    pub text: String,
}

impl VisaCard {
    pub fn from_visa(visa: &Visa, locale: Locale) -> Self {
        Self {
            id: visa.id,
            title: visa.fields.resolve_or_empty(fields::TITLE, locale).to_string(),
            text: visa.fields.resolve_or_empty(fields::TEXT, locale).to_string(),
        }
    }
}

/// 信息页（酒店、签证）的数据，保持接口顺序
#[derive(Debug, Clone, Default)]
pub struct InformationCatalog {
    hotels: Vec<Hotel>,
    assets: Vec<HotelAsset>,
    visas: Vec<Visa>,
}

impl InformationCatalog {
    pub fn new(hotels: Vec<Hotel>, assets: Vec<HotelAsset>, visas: Vec<Visa>) -> Self {
        Self { hotels, assets, visas }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self::new(snapshot.hotels, snapshot.hotel_assets, snapshot.visas)
    }

    pub fn hotel_cards(&self, locale: Locale) -> Vec<HotelCard> {
        self.hotels
            .iter()
            .map(|hotel| HotelCard::from_hotel(hotel, &self.assets, locale))
            .collect()
    }

    /// 酒店详情页
    pub fn hotel(&self, id: u64, locale: Locale) -> Result<HotelCard, ListingError> {
        self.hotels
            .iter()
            .find(|hotel| hotel.id == id)
            .map(|hotel| HotelCard::from_hotel(hotel, &self.assets, locale))
            .ok_or(ListingError::HotelNotFound(id))
    }

    pub fn visa_cards(&self, locale: Locale) -> Vec<VisaCard> {
        self.visas.iter().map(|visa| VisaCard::from_visa(visa, locale)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_common::LocalizedFields;

    fn catalog() -> InformationCatalog {
        let hotel = |id: u64, rating: f64, title: &str| Hotel {
            id,
            rating,
            fields: LocalizedFields::new()
                .with(fields::TITLE, Locale::En, title)
                .with(fields::TEXT, Locale::Ru, "<p>Текст</p>"),
        };
        let asset = |id: u64, hotel_id: u64, text: &str| HotelAsset {
            id,
            hotel_id,
            icon: Some("FaWifi".to_string()),
            fields: LocalizedFields::new().with(fields::TEXT, Locale::En, text),
        };
        InformationCatalog::new(
            vec![hotel(1, 4.6, "<b>Yyldyz</b>"), hotel(2, 7.0, "Sofitel")],
            vec![asset(10, 2, "Pool"), asset(11, 1, "<i>Wi-Fi</i>"), asset(12, 1, "Gym")],
            vec![Visa { id: 5, fields: LocalizedFields::new().with(fields::TITLE, Locale::Tk, "Wiza") }],
        )
    }

    #[test]
    fn hotel_cards_join_assets_in_order() {
        let cards = catalog().hotel_cards(Locale::En);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].plain_title, "Yyldyz");
        assert_eq!(cards[0].stars, 4);
        assert_eq!(cards[1].stars, 5);

        let texts: Vec<&str> = cards[0].assets.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, ["Wi-Fi", "Gym"]);
        assert_eq!(cards[0].assets[0].icon.as_deref(), Some("fawifi"));
    }

    #[test]
    fn hotel_detail_uses_locale_fallback() {
        let catalog = catalog();
        let card = catalog.hotel(1, Locale::Tk).unwrap();
        assert_eq!(card.title, "<b>Yyldyz</b>");
        assert_eq!(card.text, "<p>Текст</p>");
        assert!(matches!(catalog.hotel(9, Locale::En), Err(ListingError::HotelNotFound(9))));
    }

    #[test]
    fn visa_cards_resolve_titles() {
        let visas = catalog().visa_cards(Locale::Ru);
        assert_eq!(visas, [VisaCard { id: 5, title: "Wiza".to_string(), text: String::new() }]);
    }
}
