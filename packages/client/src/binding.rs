use dapr_proto::runtime::v1::InvokeBindingRequest;

use crate::client::{unexpected_response, Client};
use crate::error::{Error, Operation};
use crate::transport::{RuntimeRequest, RuntimeResponse};
use crate::types::{BindingInvocation, BindingResponse};
use crate::validate::require;

impl Client {
    /// Fire an output binding and discard its reply.
    pub fn invoke_output_binding(&self, invocation: &BindingInvocation) -> Result<(), Error> {
        self.invoke_binding(invocation).map(|_| ())
    }

    /// Invoke an output binding and return what it produced.
    pub fn invoke_binding(&self, invocation: &BindingInvocation) -> Result<BindingResponse, Error> {
        require(&invocation.name, "binding name")?;
        require(&invocation.operation, "binding operation")?;

        let operation = Operation::InvokeBinding {
            name: invocation.name.clone(),
            operation: invocation.operation.clone(),
        };
        let request = InvokeBindingRequest {
            name: invocation.name.clone(),
            data: invocation.data.clone(),
            metadata: invocation.metadata.clone(),
            operation: invocation.operation.clone(),
        };

        match self.call(&operation, RuntimeRequest::InvokeBinding(request))? {
            RuntimeResponse::InvokeBinding(response) => Ok(BindingResponse {
                data: response.data,
                metadata: response.metadata,
            }),
            _ => Err(unexpected_response(&operation, "InvokeBindingResponse")),
        }
    }
}
