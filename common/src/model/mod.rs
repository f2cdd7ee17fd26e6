pub mod celda;
pub mod cirugia;
pub mod envio;
pub mod registro;
