use cpace::{CPaceX25519Sha512, Message, Mode, Result, Role, Session, SessionInputs};
use rand_core::OsRng;
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;

fn main() -> Result<()> {
    // example password, never use this...
    const PASSWORD: &[u8] = b"g04tEd_c4pT41N";
    const CHANNEL: &[u8] = b"127.0.0.1:25519 demo channel";

    // the server socket address to bind to
    let server_socket: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 25519);

    let inputs = || {
        SessionInputs::new(PASSWORD)
            .with_channel_identifier(CHANNEL)
            .with_associated_data(&b"demo"[..])
    };

    // spawn a thread for the listening peer
    let server_thread = thread::spawn(move || -> Result<Vec<u8>> {
        let listener = TcpListener::bind(server_socket).unwrap();
        let (mut stream, peer_addr) = listener.accept().unwrap();
        println!("[server] Accepted connection from {peer_addr}");

        // buffer for receiving packets
        let mut buf = [0u8; 1024];

        let mut session: Session<CPaceX25519Sha512, OsRng> =
            Session::new(Mode::Symmetric, Role::Symmetric, inputs(), OsRng)?;

        let outbound = session.start()?.expect("symmetric peers always send");
        println!("[server] Sending message: payload + AD");
        stream
            .write_all(&bincode::serialize(&outbound).unwrap())
            .unwrap();

        let bytes_received = stream.read(&mut buf).unwrap();
        let inbound: Message = bincode::deserialize(&buf[..bytes_received]).unwrap();
        println!("[server] Received peer message");
        session.receive(&inbound)?;

        session.session_key()
    });

    // connect from this thread
    let mut stream = loop {
        if let Ok(stream) = TcpStream::connect(server_socket) {
            break stream;
        }
    };
    let mut buf = [0u8; 1024];

    let mut session: Session<CPaceX25519Sha512, OsRng> =
        Session::new(Mode::Symmetric, Role::Symmetric, inputs(), OsRng)?;

    let outbound = session.start()?.expect("symmetric peers always send");
    println!("[client] Sending message: payload + AD");
    stream
        .write_all(&bincode::serialize(&outbound).unwrap())
        .unwrap();

    let bytes_received = stream.read(&mut buf).unwrap();
    let inbound: Message = bincode::deserialize(&buf[..bytes_received]).unwrap();
    println!("[client] Received peer message");
    session.receive(&inbound)?;

    let client_key = session.session_key()?;
    let server_key = server_thread.join().unwrap()?;

    assert_eq!(client_key, server_key);
    println!("Both parties derived the same key: {}", hex::encode(client_key));

    Ok(())
}
