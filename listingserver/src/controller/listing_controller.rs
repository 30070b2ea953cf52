//! Catalog gRPC controller.
//!
//! Converts proto requests into domain types (field presence becomes an
//! explicit `Patch`), delegates to `ListingService` and maps domain
//! errors to Status.

use tonic::{Request, Response, Status};

use crate::listings::catalog_server::Catalog;
use crate::listings::{
    CreateListingRequest, CreateListingResponse, DeleteListingRequest, DeleteListingResponse,
    GetListingRequest, GetListingResponse, UpdateListingRequest, UpdateListingResponse,
};
use crate::service::{ListingProvider, ListingSaver, ListingService};
use shared::model::{ListingPatch, NewListing, Patch};

pub struct ListingController<S, P> {
    svc: ListingService<S, P>,
}

impl<S, P> ListingController<S, P>
where
    S: ListingSaver + 'static,
    P: ListingProvider + 'static,
{
    pub fn new(svc: ListingService<S, P>) -> Self {
        Self { svc }
    }
}

#[tonic::async_trait]
impl<S, P> Catalog for ListingController<S, P>
where
    S: ListingSaver + 'static,
    P: ListingProvider + 'static,
{
    async fn create_listing(
        &self,
        request: Request<CreateListingRequest>,
    ) -> Result<Response<CreateListingResponse>, Status> {
        let req = request.into_inner();

        let new = NewListing {
            title: req.title,
            description: req.description,
            quantity: req.quantity,
            category: req.category,
            closed: req.closed,
            price: req.price,
        };

        let id = self
            .svc
            .create(new, &req.token)
            .await
            .map_err(|e| e.to_status("listings.CreateListing"))?;

        Ok(Response::new(CreateListingResponse { id }))
    }

    async fn get_listing(
        &self,
        request: Request<GetListingRequest>,
    ) -> Result<Response<GetListingResponse>, Status> {
        let req = request.into_inner();

        let listing = self
            .svc
            .get(req.id)
            .await
            .map_err(|e| e.to_status("listings.GetListing"))?;

        Ok(Response::new(GetListingResponse {
            title: listing.title,
            description: listing.description,
            quantity: listing.quantity,
            category: listing.category,
            closed: listing.closed,
            price: listing.price,
            creator: listing.creator,
        }))
    }

    async fn update_listing(
        &self,
        request: Request<UpdateListingRequest>,
    ) -> Result<Response<UpdateListingResponse>, Status> {
        let req = request.into_inner();

        let patch = ListingPatch {
            title: Patch::from_option(req.title),
            description: Patch::from_option(req.description),
            quantity: Patch::from_option(req.quantity),
            category: Patch::from_option(req.category),
            closed: Patch::from_option(req.closed),
            price: Patch::from_option(req.price),
        };

        self.svc
            .update(req.id, patch, &req.token)
            .await
            .map_err(|e| e.to_status("listings.UpdateListing"))?;

        Ok(Response::new(UpdateListingResponse { succeeded: true }))
    }

    async fn delete_listing(
        &self,
        request: Request<DeleteListingRequest>,
    ) -> Result<Response<DeleteListingResponse>, Status> {
        let req = request.into_inner();

        self.svc
            .delete(req.id, &req.token)
            .await
            .map_err(|e| e.to_status("listings.DeleteListing"))?;

        Ok(Response::new(DeleteListingResponse { succeeded: true }))
    }
}
