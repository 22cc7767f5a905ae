#![allow(non_snake_case)]

use InspectionLibrary::inspection::manager::Inspection;

#[actix_web::main]
async fn main() {
    Inspection::run().await;
    Inspection::terminate().await;
}
