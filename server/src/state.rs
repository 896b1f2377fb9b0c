use boxoffice_core::TicketOptionService;

#[derive(Clone)]
pub struct AppState {
    service: TicketOptionService,
}

impl AppState {
    pub fn new(service: TicketOptionService) -> Self { Self { service } }

    pub fn service(&self) -> &TicketOptionService { &self.service }
}
