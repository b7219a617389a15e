//! Buyer and seller dashboard endpoints

use super::{ClientError, MarketClient};
use crate::client::request::ApiRequest;
use crate::types::{AvatarUpdate, NewTrainingRequest};
use avatarmart_core::{Avatar, Generation, TrainingRequest};

impl MarketClient {
    /// Generations charged to the current buyer, newest first
    pub async fn my_generations(&self) -> Result<Vec<Generation>, ClientError> {
        self.send(ApiRequest::get("/my/generations")).await
    }

    /// Training requests submitted by the current seller
    pub async fn my_training_requests(&self) -> Result<Vec<TrainingRequest>, ClientError> {
        self.send(ApiRequest::get("/my/training-requests")).await
    }

    /// Submit avatar metadata and reference photos for training
    pub async fn create_training_request(
        &self,
        request: &NewTrainingRequest,
    ) -> Result<TrainingRequest, ClientError> {
        let req = ApiRequest::post("/my/training-requests").multipart(request.to_form());
        self.send(req).await
    }

    /// Avatars owned by the current seller
    pub async fn my_avatars(&self) -> Result<Vec<Avatar>, ClientError> {
        self.send(ApiRequest::get("/my/avatars")).await
    }

    /// Edit an avatar, optionally replacing its preview image
    pub async fn update_avatar(
        &self,
        avatar_id: i64,
        update: &AvatarUpdate,
    ) -> Result<Avatar, ClientError> {
        let req = ApiRequest::put(format!("/my/avatars/{avatar_id}")).multipart(update.to_form());
        self.send(req).await
    }
}
