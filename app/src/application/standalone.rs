use super::utils::BTSWEEP_SOCKET;
use crate::{
    error::{BtsweepError, BtsweepResult},
    ipc::{connect_to_socket, message::Message, RequestResponse},
    opts::CommandOpts,
};

pub async fn send_command(command: CommandOpts) -> BtsweepResult<()> {
    let stream = connect_to_socket(&BTSWEEP_SOCKET, 3, 100).await?;

    log::info!("Send command to server: {}", command);

    let response_message = stream
        .send_and_receive_message(Message::try_from(command)?)
        .await?;

    if !response_message.is_valid() {
        return Err(BtsweepError::InvalidResponse);
    }

    log::info!(
        "Response from server: {}",
        String::from_utf8(response_message.payload).map_err(|_| BtsweepError::ParseError)?
    );

    Ok(())
}
