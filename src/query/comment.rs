use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use super::{facet_stage, Page};

/// Comments of one video in natural store order, paginated.
pub fn listing_pipeline(video_id: ObjectId, page: Page) -> Vec<Document> {
    vec![doc! { "$match": { "video": video_id } }, facet_stage(page)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_matches_video_then_paginates() {
        let video_id = ObjectId::new();
        let pipeline = listing_pipeline(video_id, Page::new(Some(2), Some(10)));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline[0]
                .get_document("$match")
                .unwrap()
                .get_object_id("video")
                .unwrap(),
            video_id
        );
        let facet = pipeline[1].get_document("$facet").unwrap();
        let docs = facet.get_array("docs").unwrap();
        assert_eq!(docs[0].as_document().unwrap().get_i64("$skip").unwrap(), 10);
    }
}
