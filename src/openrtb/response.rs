use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// OpenRTB Bid Response
/// 合作方不出价时 seatbid 可能整个缺失，因此为 Option。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BidResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "seats_without_nulls", skip_serializing_if = "Option::is_none")]
    pub seatbid: Option<Vec<SeatBid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cur: Option<String>,
    /// No-bid reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbr: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SeatBid {
    /// `null` 或缺失都视为空列表
    #[serde(default, deserialize_with = "without_nulls")]
    pub bid: Vec<Bid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Bid {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub impid: String,
    #[serde(default)]
    pub price: f64,
    /// Ad markup (HTML / VAST / JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,
    /// Win notice URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurl: Option<String>,
    /// Billing notice URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burl: Option<String>,
    /// Loss notice URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lurl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adomain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    /// 1 = banner, 2 = video, 3 = audio, 4 = native
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtype: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<Map<String, Value>>,
}

/// 丢弃数组中的 `null` 元素，整个字段为 `null` 时返回空列表
fn without_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

fn seats_without_nulls<'de, D>(deserializer: D) -> Result<Option<Vec<SeatBid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let seats = Option::<Vec<Option<SeatBid>>>::deserialize(deserializer)?;
    Ok(seats.map(|seats| seats.into_iter().flatten().collect()))
}

impl BidResponse {
    /// 所有 seat 下的出价
    pub fn bids(&self) -> impl Iterator<Item = &Bid> {
        self.seatbid
            .iter()
            .flatten()
            .flat_map(|seatbid| seatbid.bid.iter())
    }
}
