//! niconico API Data Structures

use serde::{Deserialize, Serialize};

// ============================================================================
// Upstream watch API response (validated by schema::WATCH_RESPONSE_SCHEMA)
// ============================================================================

/// `/api/watch/v3_guest/{id}` response
#[derive(Debug, Clone, Deserialize)]
pub struct WatchResponse {
    pub meta: WatchMeta,
    pub data: WatchData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchMeta {
    /// Upstream's own status code, distinct from the HTTP status
    pub status: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchData {
    /// Absent for channel videos and deleted accounts
    #[serde(default)]
    pub owner: Option<Owner>,
    pub tag: TagList,
    pub video: Video,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub nickname: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    pub items: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub count: VideoCount,
    /// Seconds
    pub duration: i64,
    pub thumbnail: Thumbnail,
    /// ISO-8601 with offset, passed through untouched
    pub registered_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoCount {
    pub view: i64,
    pub comment: i64,
    pub mylist: i64,
    pub like: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub middle_url: Option<String>,
    #[serde(default)]
    pub large_url: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    pub ogp: String,
}

// ============================================================================
// Normalized output
// ============================================================================

/// Stable video metadata returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedVideo {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    pub view: i64,
    pub comment: i64,
    pub like: i64,
    pub mylist: i64,
    pub tags: Vec<String>,
    pub description: String,
    pub duration: i64,
    pub registered_at: String,
    pub thumbnail_url: String,
}

impl From<WatchResponse> for NormalizedVideo {
    fn from(response: WatchResponse) -> Self {
        let WatchData { owner, tag, video } = response.data;

        Self {
            id: video.id,
            title: video.title,
            owner_id: owner.map(|o| o.id),
            view: video.count.view,
            comment: video.count.comment,
            like: video.count.like,
            mylist: video.count.mylist,
            tags: tag.items.into_iter().map(|t| t.name).collect(),
            description: video.description,
            duration: video.duration,
            registered_at: video.registered_at,
            thumbnail_url: video.thumbnail.ogp,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// A trimmed but structurally complete watch payload for `sm9`
    pub(crate) fn sample_watch_json() -> Value {
        json!({
            "meta": {"status": 200},
            "data": {
                "owner": {
                    "id": 4,
                    "nickname": "chiro",
                    "iconUrl": "https://secure-dcdn.cdn.nimg.jp/nicoaccount/usericon/0/4.jpg"
                },
                "tag": {
                    "items": [
                        {"name": "陰陽師", "isLocked": true},
                        {"name": "レッツゴー!陰陽師"},
                        {"name": "公式"}
                    ]
                },
                "video": {
                    "id": "sm9",
                    "title": "新・豪血寺一族 -煩悩解放 - レッツゴー!陰陽師",
                    "description": "レッツゴー!陰陽師（フルコーラスバージョン）",
                    "count": {"view": 21_000_000, "comment": 5_400_000, "mylist": 180_000, "like": 60_000},
                    "duration": 319,
                    "thumbnail": {
                        "url": "https://nicovideo.cdn.nimg.jp/thumbnails/9/9",
                        "middleUrl": "https://nicovideo.cdn.nimg.jp/thumbnails/9/9.M",
                        "largeUrl": "https://nicovideo.cdn.nimg.jp/thumbnails/9/9.L",
                        "player": "https://img.cdn.nimg.jp/s/nicovideo/thumbnails/9/9.player",
                        "ogp": "https://img.cdn.nimg.jp/s/nicovideo/thumbnails/9/9.ogp"
                    },
                    "registeredAt": "2007-03-06T00:33:00+09:00"
                }
            }
        })
    }

    fn parse(value: Value) -> WatchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_full_payload() {
        let video = NormalizedVideo::from(parse(sample_watch_json()));

        assert_eq!(video.id, "sm9");
        assert_eq!(video.owner_id, Some(4));
        assert_eq!(video.view, 21_000_000);
        assert_eq!(video.comment, 5_400_000);
        assert_eq!(video.mylist, 180_000);
        assert_eq!(video.like, 60_000);
        assert_eq!(video.duration, 319);
        assert_eq!(video.registered_at, "2007-03-06T00:33:00+09:00");
        assert_eq!(
            video.thumbnail_url,
            "https://img.cdn.nimg.jp/s/nicovideo/thumbnails/9/9.ogp"
        );
    }

    #[test]
    fn test_tags_keep_order_and_duplicates() {
        let mut body = sample_watch_json();
        body["data"]["tag"]["items"] = json!([{"name": "b"}, {"name": "a"}, {"name": "b"}]);

        let video = NormalizedVideo::from(parse(body));
        assert_eq!(video.tags, ["b", "a", "b"]);
    }

    #[test]
    fn test_missing_owner_omits_owner_id() {
        let mut body = sample_watch_json();
        body["data"]["owner"] = Value::Null;

        let video = NormalizedVideo::from(parse(body));
        assert_eq!(video.owner_id, None);

        let serialized = serde_json::to_value(&video).unwrap();
        assert!(serialized.get("ownerId").is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let video = NormalizedVideo::from(parse(sample_watch_json()));
        let serialized = serde_json::to_value(&video).unwrap();

        let mut keys: Vec<_> = serialized.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "comment", "description", "duration", "id", "like", "mylist", "ownerId",
                "registeredAt", "tags", "thumbnailUrl", "title", "view",
            ]
        );
    }
}
